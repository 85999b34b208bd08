pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::storage::ObjectStore;
use axum::{
    Router,
    http::{Method, header},
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login,
        api::handlers::images::upload_image,
        api::handlers::images::list_images,
        api::handlers::images::update_image,
        api::handlers::images::delete_image,
        api::handlers::projects::get_project,
        api::handlers::events::create_event,
        api::handlers::events::list_events,
        api::handlers::events::list_active_events,
        api::handlers::events::update_event,
        api::handlers::events::delete_event,
        api::handlers::contacts::submit_contact,
        api::handlers::contacts::list_contacts,
        api::handlers::contacts::mark_contact_read,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::auth::UserInfo,
            api::handlers::images::UploadMetadata,
            api::handlers::images::UploadResponse,
            api::handlers::images::ImagesResponse,
            api::handlers::images::UpdateImageRequest,
            api::handlers::projects::ProjectResponse,
            api::handlers::events::CreateEventRequest,
            api::handlers::events::UpdateEventRequest,
            api::handlers::events::EventResponse,
            api::handlers::events::EventsResponse,
            api::handlers::contacts::ContactForm,
            api::handlers::contacts::ContactResponse,
            api::handlers::contacts::SubmissionsResponse,
            api::handlers::health::HealthResponse,
            api::handlers::SuccessResponse,
            models::ImageRecord,
            models::ImageStatus,
            models::Project,
            models::ScheduledEvent,
            models::ContactSubmission,
        )
    ),
    tags(
        (name = "auth", description = "Admin authentication"),
        (name = "images", description = "Portfolio image upload and catalog"),
        (name = "projects", description = "Derived per-customer project views"),
        (name = "events", description = "Scheduled popup events"),
        (name = "contact", description = "Contact inquiries"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

/// Shared handles passed into every handler. Owned by the dispatcher,
/// never mutated by handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub storage: Arc<dyn ObjectStore>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/auth/login", post(api::handlers::auth::login))
        .route(
            "/upload",
            post(api::handlers::images::upload_image)
                .layer(axum::extract::DefaultBodyLimit::max(
                    state.config.max_upload_size + 1024 * 1024, // multipart overhead
                ))
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route("/images", get(api::handlers::images::list_images))
        .route(
            "/images/:id",
            put(api::handlers::images::update_image)
                .delete(api::handlers::images::delete_image)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/project/:project_id",
            get(api::handlers::projects::get_project),
        )
        .route(
            "/contact",
            post(api::handlers::contacts::submit_contact).merge(
                get(api::handlers::contacts::list_contacts).layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
            ),
        )
        .route(
            "/contact/:id/read",
            put(api::handlers::contacts::mark_contact_read).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/events",
            post(api::handlers::events::create_event)
                .get(api::handlers::events::list_events)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/events/active",
            get(api::handlers::events::list_active_events),
        )
        .route(
            "/events/:id",
            put(api::handlers::events::update_event)
                .delete(api::handlers::events::delete_event)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .max_age(Duration::from_secs(86400)),
        )
        .with_state(state)
}
