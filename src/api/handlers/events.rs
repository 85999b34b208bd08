use crate::api::error::AppError;
use crate::api::handlers::SuccessResponse;
use crate::models::ScheduledEvent;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const EVENT_COLUMNS: &str =
    "id, title, message, image_url, scheduled_date, scheduled_time, active, created_at, updated_at";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default)]
    pub scheduled_time: String,
    #[serde(default)]
    pub active: bool,
}

/// Sparse patch: only supplied fields are rewritten. Contrast with the
/// image update, which overwrites the full mutable shape.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub image_url: Option<String>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct EventResponse {
    pub success: bool,
    pub event: ScheduledEvent,
}

#[derive(Serialize, ToSchema)]
pub struct EventsResponse {
    pub events: Vec<ScheduledEvent>,
}

fn validate_date(date: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::BadRequest("scheduledDate must be YYYY-MM-DD".to_string()))
}

fn validate_time(time: &str) -> Result<(), AppError> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::BadRequest("scheduledTime must be HH:MM".to_string()))
}

/// Destructive read-side sweep: listing events deletes every row scheduled
/// strictly before the server-local calendar date.
async fn sweep_expired(db: &SqlitePool) -> Result<(), AppError> {
    let today = Local::now().format("%Y-%m-%d").to_string();

    let result = sqlx::query("DELETE FROM scheduled_events WHERE scheduled_date < ?")
        .bind(&today)
        .execute(db)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(swept = result.rows_affected(), "expired events removed");
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event scheduled", body = EventResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    req.validate()?;
    validate_date(&req.scheduled_date)?;
    validate_time(&req.scheduled_time)?;

    let event = ScheduledEvent {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        message: req.message,
        image_url: req.image_url,
        scheduled_date: req.scheduled_date,
        scheduled_time: req.scheduled_time,
        active: req.active,
        created_at: Utc::now(),
        updated_at: None,
    };

    sqlx::query(
        "INSERT INTO scheduled_events (id, title, message, image_url, scheduled_date, \
         scheduled_time, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.id)
    .bind(&event.title)
    .bind(&event.message)
    .bind(&event.image_url)
    .bind(&event.scheduled_date)
    .bind(&event.scheduled_time)
    .bind(event.active)
    .bind(event.created_at)
    .execute(&state.db)
    .await?;

    Ok(Json(EventResponse {
        success: true,
        event,
    }))
}

#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "All remaining events, newest schedule first", body = EventsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<EventsResponse>, AppError> {
    sweep_expired(&state.db).await?;

    let events: Vec<ScheduledEvent> = sqlx::query_as(&format!(
        "SELECT {EVENT_COLUMNS} FROM scheduled_events \
         ORDER BY scheduled_date DESC, scheduled_time DESC"
    ))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EventsResponse { events }))
}

#[utoipa::path(
    get,
    path = "/events/active",
    responses(
        (status = 200, description = "Active events dated today or later, soonest first", body = EventsResponse)
    ),
    tag = "events"
)]
pub async fn list_active_events(
    State(state): State<crate::AppState>,
) -> Result<Json<EventsResponse>, AppError> {
    sweep_expired(&state.db).await?;

    let today = Local::now().format("%Y-%m-%d").to_string();

    // Today-or-future superset; the popup client narrows to the exact
    // time-of-day window on its own timer.
    let events: Vec<ScheduledEvent> = sqlx::query_as(&format!(
        "SELECT {EVENT_COLUMNS} FROM scheduled_events \
         WHERE active = 1 AND scheduled_date >= ? \
         ORDER BY scheduled_date, scheduled_time"
    ))
    .bind(&today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EventsResponse { events }))
}

#[utoipa::path(
    put,
    path = "/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Supplied fields rewritten", body = SuccessResponse),
        (status = 400, description = "Malformed date or time"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if let Some(date) = &req.scheduled_date {
        validate_date(date)?;
    }
    if let Some(time) = &req.scheduled_time {
        validate_time(time)?;
    }

    sqlx::query(
        "UPDATE scheduled_events SET \
         title = COALESCE(?, title), \
         message = COALESCE(?, message), \
         image_url = COALESCE(?, image_url), \
         scheduled_date = COALESCE(?, scheduled_date), \
         scheduled_time = COALESCE(?, scheduled_time), \
         active = COALESCE(?, active), \
         updated_at = ? WHERE id = ?",
    )
    .bind(req.title)
    .bind(req.message)
    .bind(req.image_url)
    .bind(req.scheduled_date)
    .bind(req.scheduled_time)
    .bind(req.active)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Row deleted (no-op for unknown ids)", body = SuccessResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    sqlx::query("DELETE FROM scheduled_events WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
