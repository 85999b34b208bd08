use crate::api::error::AppError;
use crate::api::handlers::SuccessResponse;
use crate::models::ContactSubmission;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const CONTACT_COLUMNS: &str = "id, name, email, phone, project_type, budget, timeline, message, \
     read_status, submitted_at";

fn default_project_type() -> String {
    "other".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default = "default_project_type")]
    pub project_type: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub contact_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionsResponse {
    pub submissions: Vec<ContactSubmission>,
}

#[derive(Deserialize)]
pub struct ListContactsQuery {
    pub read: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Inquiry stored", body = ContactResponse),
        (status = 400, description = "Missing or invalid fields")
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(state): State<crate::AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>, AppError> {
    form.validate()?;

    let contact_id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO contact_submissions (id, name, email, phone, project_type, budget, \
         timeline, message, read_status, submitted_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(&contact_id)
    .bind(&form.name)
    .bind(&form.email)
    .bind(&form.phone)
    .bind(&form.project_type)
    .bind(&form.budget)
    .bind(&form.timeline)
    .bind(&form.message)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    tracing::info!(contact_id = %contact_id, "contact inquiry received");

    Ok(Json(ContactResponse {
        success: true,
        contact_id,
    }))
}

#[utoipa::path(
    get,
    path = "/contact",
    params(
        ("read" = Option<bool>, Query, description = "Filter by read state; omit for all")
    ),
    responses(
        (status = 200, description = "Submissions, newest first", body = SubmissionsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "contact"
)]
pub async fn list_contacts(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<SubmissionsResponse>, AppError> {
    let submissions: Vec<ContactSubmission> = match query.read {
        Some(read) => {
            sqlx::query_as(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contact_submissions WHERE read_status = ? \
                 ORDER BY submitted_at DESC"
            ))
            .bind(read)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contact_submissions ORDER BY submitted_at DESC"
            ))
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(SubmissionsResponse { submissions }))
}

#[utoipa::path(
    put,
    path = "/contact/{id}/read",
    params(("id" = String, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Marked read (idempotent)", body = SuccessResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "contact"
)]
pub async fn mark_contact_read(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    sqlx::query("UPDATE contact_submissions SET read_status = 1 WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
