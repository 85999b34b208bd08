use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
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

fn inquiry(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "555-0101",
        "projectType": "kitchen",
        "budget": "10-20k",
        "timeline": "3 months",
        "message": "We would like a consultation."
    })
}

#[tokio::test]
async fn test_submission_is_public_and_starts_unread() {
    let (app, pool) = setup().await;

    let (status, json) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(inquiry("Jane", "jane@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let contact_id = json["contactId"].as_str().unwrap();
    let read_status: bool =
        sqlx::query_scalar("SELECT read_status FROM contact_submissions WHERE id = ?")
            .bind(contact_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!read_status);
}

#[tokio::test]
async fn test_submission_defaults_optional_fields() {
    let (app, pool) = setup().await;

    let (status, json) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "phone": "555-0102",
            "message": "Just the required fields."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (project_type, budget, timeline): (String, String, String) = sqlx::query_as(
        "SELECT project_type, budget, timeline FROM contact_submissions WHERE id = ?",
    )
    .bind(json["contactId"].as_str().unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(project_type, "other");
    assert_eq!(budget, "");
    assert_eq!(timeline, "");
}

#[tokio::test]
async fn test_submission_rejects_invalid_input() {
    let (app, _pool) = setup().await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(json!({ "name": "Jane", "email": "not-an-email", "phone": "1", "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(json!({ "email": "jane@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_requires_auth_and_filters_by_read_state() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;

    let (status, _) = request_json(&app, "GET", "/contact", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, first) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(inquiry("First", "first@example.com")),
    )
    .await;
    let (_, second) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(inquiry("Second", "second@example.com")),
    )
    .await;
    let first_id = first["contactId"].as_str().unwrap().to_string();
    let second_id = second["contactId"].as_str().unwrap().to_string();

    let token = login(&app).await;

    let (status, json) = request_json(&app, "GET", "/contact", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["submissions"].as_array().unwrap().len(), 2);

    let uri = format!("/contact/{}/read", first_id);
    let (status, _) = request_json(&app, "PUT", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, unread) = request_json(&app, "GET", "/contact?read=false", Some(token.as_str()), None).await;
    let unread = unread["submissions"].as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["id"].as_str().unwrap(), second_id);

    let (_, read) = request_json(&app, "GET", "/contact?read=true", Some(token.as_str()), None).await;
    let read = read["submissions"].as_array().unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0]["id"].as_str().unwrap(), first_id);
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let (app, pool) = setup().await;
    seed_admin(&pool).await;
    let token = login(&app).await;

    let (_, submitted) = request_json(
        &app,
        "POST",
        "/contact",
        None,
        Some(inquiry("Jane", "jane@example.com")),
    )
    .await;
    let contact_id = submitted["contactId"].as_str().unwrap().to_string();
    let uri = format!("/contact/{}/read", contact_id);

    for _ in 0..2 {
        let (status, json) = request_json(&app, "PUT", &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);

        let read_status: bool =
            sqlx::query_scalar("SELECT read_status FROM contact_submissions WHERE id = ?")
                .bind(&contact_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(read_status);
    }
}
