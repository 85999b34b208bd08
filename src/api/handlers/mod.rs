pub mod auth;
pub mod contacts;
pub mod events;
pub mod health;
pub mod images;
pub mod projects;

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope for mutations that return no payload.
#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
