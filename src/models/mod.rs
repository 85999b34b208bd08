use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Publication state of a portfolio image. Drafts are only visible to the
/// admin; the public gallery and project views see published rows only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ImageStatus {
    #[default]
    Draft,
    Published,
}

/// Pre-provisioned admin account. Only read at login; `last_login` is the
/// single column this service ever writes back.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub last_login: Option<DateTime<Utc>>,
}

/// Catalog row as stored: tags are kept as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub id: String,
    pub public_id: String,
    pub image_url: String,
    pub customer_number: String,
    pub customer_name: String,
    pub phone: String,
    pub category: String,
    pub tags: String,
    pub description: String,
    pub status: ImageStatus,
    pub project_id: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One uploaded portfolio asset as seen by API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    /// Object-store key the binary lives under.
    pub public_id: String,
    pub image_url: String,
    pub customer_number: String,
    pub customer_name: String,
    pub phone: String,
    pub category: String,
    pub tags: Vec<String>,
    pub description: String,
    pub status: ImageStatus,
    pub project_id: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ImageRow> for ImageRecord {
    fn from(row: ImageRow) -> Self {
        // Malformed or empty tag text reads as no tags, never as an error.
        let tags = serde_json::from_str(&row.tags).unwrap_or_default();

        Self {
            id: row.id,
            public_id: row.public_id,
            image_url: row.image_url,
            customer_number: row.customer_number,
            customer_name: row.customer_name,
            phone: row.phone,
            category: row.category,
            tags,
            description: row.description,
            status: row.status,
            project_id: row.project_id,
            uploaded_at: row.uploaded_at,
            updated_at: row.updated_at,
        }
    }
}

/// Derived per-customer aggregate over published images. Never persisted;
/// recomputed from the catalog on every read.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub customer_number: String,
    pub customer_name: String,
    pub phone: String,
    pub description: String,
    pub categories: Vec<String>,
    pub images_by_category: BTreeMap<String, Vec<String>>,
    pub all_images: Vec<String>,
    pub year: String,
}

/// A timed popup announcement.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub id: String,
    pub title: String,
    pub message: String,
    pub image_url: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub scheduled_date: String,
    /// Time of day, `HH:MM`.
    pub scheduled_time: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An inbound inquiry from the public contact form.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub budget: String,
    pub timeline: String,
    pub message: String,
    pub read_status: bool,
    pub submitted_at: DateTime<Utc>,
}
