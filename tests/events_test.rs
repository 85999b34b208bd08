use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Local, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use studio_backend::config::AppConfig;
use studio_backend::services::storage::{MemoryObjectStore, ObjectStore};
use studio_backend::{AppState, create_app};
use tower::ServiceExt;

async fn setup() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let storage = Arc::new(MemoryObjectStore::default());
    let state = AppState {
        db: pool.clone(),
        storage: storage as Arc<dyn ObjectStore>,
        config: AppConfig::development(),
    };

    (create_app(state), pool)
}

async fn seed_admin(pool: &SqlitePool) {
    use argon2::Argon2;
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"studio123", &salt)
        .unwrap()
        .to_string();

    sqlx::query("INSERT INTO admin_users (id, username, password_hash, email) VALUES (?, ?, ?, ?)")
        .bind("admin_1")
        .bind("admin")
        .bind(hash)
        .bind("admin@example.com")
        .execute(pool)
        .await
        .unwrap();
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username": "admin", "password": "studio123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["token"].as_str().unwrap().to_string()
}

fn local_date(days_from_today: i64) -> String {
    (Local::now().date_naive() + Duration::days(days_from_today))
        .format("%Y-%m-%d")
        .to_string()
}

async fn insert_event(pool: &SqlitePool, id: &str, date: &str, time: &str, active: bool) {
    sqlx::query(
        "INSERT INTO scheduled_events (id, title, message, image_url, scheduled_date, \
         scheduled_time, active, created_at) VALUES (?, ?, ?, '', ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(format!("Event {id}"))
    .bind("Come visit the showroom")
    .bind(date)
    .bind(time)
    .bind(active)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_create_and_list_events() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    let (status, json) = request_json(
        &app,
        "POST",
        "/events",
        Some(token.as_str()),
        Some(json!({
            "title": "Spring Open House",
            "message": "Tour the new showroom",
            "scheduledDate": local_date(3),
            "scheduledTime": "18:00",
            "active": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {:?}", json);
    assert_eq!(json["success"], true);
    assert_eq!(json["event"]["title"], "Spring Open House");
    assert!(!json["event"]["id"].as_str().unwrap().is_empty());

    let (status, json) = request_json(&app, "GET", "/events", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_event_requires_fields_and_auth() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/events",
        Some(token.as_str()),
        Some(json!({ "title": "No message" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request_json(
        &app,
        "POST",
        "/events",
        Some(token.as_str()),
        Some(json!({
            "title": "Bad date",
            "message": "x",
            "scheduledDate": "next tuesday",
            "scheduledTime": "18:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request_json(
        &app,
        "POST",
        "/events",
        None,
        Some(json!({
            "title": "T",
            "message": "M",
            "scheduledDate": local_date(1),
            "scheduledTime": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request_json(&app, "GET", "/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_sweeps_past_events_permanently() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    insert_event(&pool, "past", &local_date(-1), "10:00", true).await;
    insert_event(&pool, "future", &local_date(5), "10:00", true).await;

    let (_, json) = request_json(&app, "GET", "/events", Some(token.as_str()), None).await;
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], "future");

    // The sweep is a real delete, not response-side filtering.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_active_feed_is_public_and_sweeps_too() {
    let (app, pool) = setup().await;

    insert_event(&pool, "past", &local_date(-2), "10:00", true).await;
    insert_event(&pool, "today", &local_date(0), "09:00", true).await;
    insert_event(&pool, "later", &local_date(7), "12:00", true).await;
    insert_event(&pool, "inactive", &local_date(7), "13:00", false).await;

    // No Authorization header: the popup feed is public.
    let (status, json) = request_json(&app, "GET", "/events/active", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    // Ascending: today's event first, the one a week out second.
    assert_eq!(events[0]["id"], "today");
    assert_eq!(events[1]["id"], "later");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3); // past one swept, inactive one kept
}

#[tokio::test]
async fn test_update_is_a_sparse_patch() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    insert_event(&pool, "ev_1", &local_date(3), "18:00", true).await;

    let (status, _) = request_json(
        &app,
        "PUT",
        "/events/ev_1",
        Some(token.as_str()),
        Some(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (title, message, time, active): (String, String, String, bool) = sqlx::query_as(
        "SELECT title, message, scheduled_time, active FROM scheduled_events WHERE id = 'ev_1'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    // Only the supplied field changed.
    assert_eq!(title, "Renamed");
    assert_eq!(message, "Come visit the showroom");
    assert_eq!(time, "18:00");
    assert!(active);
}

#[tokio::test]
async fn test_delete_event_is_unconditional() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    insert_event(&pool, "ev_1", &local_date(3), "18:00", true).await;

    let (status, json) = request_json(&app, "DELETE", "/events/ev_1", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    // Unknown ids are a quiet no-op, same success envelope.
    let (status, json) = request_json(&app, "DELETE", "/events/no_such", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}
