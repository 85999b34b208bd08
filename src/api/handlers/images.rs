use crate::api::error::AppError;
use crate::api::handlers::SuccessResponse;
use crate::models::{ImageRecord, ImageRow, ImageStatus};
use crate::utils::auth::Claims;
use crate::utils::paths::{derive_storage_key, project_id, public_url};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const IMAGE_COLUMNS: &str = "id, public_id, image_url, customer_number, customer_name, phone, \
     category, tags, description, status, project_id, uploaded_at, updated_at";

/// JSON `metadata` part of the upload form.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    #[serde(default)]
    pub customer_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub status: Option<ImageStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub image: ImageRecord,
}

#[derive(Serialize, ToSchema)]
pub struct ImagesResponse {
    pub images: Vec<ImageRecord>,
}

#[derive(Deserialize)]
pub struct ListImagesQuery {
    pub status: Option<ImageStatus>,
    pub category: Option<String>,
}

/// Full-overwrite update payload: absent fields are written back as blank,
/// absent status resets to draft. This is deliberately not a sparse patch.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ImageStatus,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = UploadMetadata,
        description = "multipart/form-data with a binary `file` part and a JSON `metadata` part",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Image stored and cataloged", body = UploadResponse),
        (status = 400, description = "Missing file, missing metadata, or invalid metadata"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "images"
)]
pub async fn upload_image(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut metadata_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((file_name, content_type, data));
            }
            "metadata" => {
                metadata_text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let metadata_text =
        metadata_text.ok_or_else(|| AppError::BadRequest("No metadata provided".to_string()))?;

    let metadata: UploadMetadata =
        serde_json::from_str(&metadata_text).map_err(|e| AppError::InvalidPayload {
            message: "Invalid metadata format".to_string(),
            details: e.to_string(),
        })?;

    if metadata.customer_number.trim().is_empty()
        || metadata.customer_name.trim().is_empty()
        || metadata.category.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Missing required fields: customerNumber, customerName, or category".to_string(),
        ));
    }

    let storage_key = derive_storage_key(
        &metadata.customer_number,
        &metadata.customer_name,
        &metadata.category,
        &file_name,
    );
    let image_url = public_url(&state.config.public_base_url, &storage_key);

    // Blob first. If this fails nothing has been cataloged; if the insert
    // below fails the blob is orphaned (no compensating delete).
    state
        .storage
        .put(&storage_key, data, &content_type)
        .await
        .map_err(AppError::Storage)?;

    let record = ImageRecord {
        id: Uuid::new_v4().to_string(),
        public_id: storage_key,
        image_url,
        customer_number: metadata.customer_number.clone(),
        customer_name: metadata.customer_name.clone(),
        phone: metadata.phone,
        category: metadata.category,
        tags: metadata.tags,
        description: metadata.description,
        status: metadata.status.unwrap_or_default(),
        project_id: project_id(&metadata.customer_number, &metadata.customer_name),
        uploaded_at: Utc::now(),
        updated_at: None,
    };

    let tags_json =
        serde_json::to_string(&record.tags).map_err(|e| AppError::Internal(e.to_string()))?;

    sqlx::query(
        "INSERT INTO images (id, public_id, image_url, customer_number, customer_name, phone, \
         category, tags, description, status, project_id, uploaded_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.public_id)
    .bind(&record.image_url)
    .bind(&record.customer_number)
    .bind(&record.customer_name)
    .bind(&record.phone)
    .bind(&record.category)
    .bind(&tags_json)
    .bind(&record.description)
    .bind(record.status)
    .bind(&record.project_id)
    .bind(record.uploaded_at)
    .execute(&state.db)
    .await?;

    tracing::info!(image_id = %record.id, key = %record.public_id, "image uploaded");

    Ok(Json(UploadResponse {
        success: true,
        image: record,
    }))
}

#[utoipa::path(
    get,
    path = "/images",
    params(
        ("status" = Option<String>, Query, description = "draft or published; defaults to published"),
        ("category" = Option<String>, Query, description = "Category filter; `All` disables it")
    ),
    responses(
        (status = 200, description = "Matching catalog rows, newest first", body = ImagesResponse)
    ),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<crate::AppState>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ImagesResponse>, AppError> {
    let status = query.status.unwrap_or(ImageStatus::Published);

    // `All` is a sentinel from the gallery UI, not a real category.
    let category = query.category.filter(|c| c.as_str() != "All");

    let rows: Vec<ImageRow> = match category {
        Some(category) => {
            sqlx::query_as(&format!(
                "SELECT {IMAGE_COLUMNS} FROM images WHERE status = ? AND category = ? \
                 ORDER BY uploaded_at DESC"
            ))
            .bind(status)
            .bind(category)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {IMAGE_COLUMNS} FROM images WHERE status = ? ORDER BY uploaded_at DESC"
            ))
            .bind(status)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(ImagesResponse {
        images: rows.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/images/{id}",
    params(("id" = String, Path, description = "Image ID")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Row overwritten", body = SuccessResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "images"
)]
pub async fn update_image(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let tags_json =
        serde_json::to_string(&req.tags).map_err(|e| AppError::Internal(e.to_string()))?;

    sqlx::query(
        "UPDATE images SET customer_name = ?, phone = ?, category = ?, tags = ?, \
         description = ?, status = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&req.customer_name)
    .bind(&req.phone)
    .bind(&req.category)
    .bind(&tags_json)
    .bind(&req.description)
    .bind(req.status)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/images/{id}",
    params(("id" = String, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Blob and row deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Image not found")
    ),
    security(("jwt" = [])),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let row: ImageRow =
        sqlx::query_as(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"))
            .bind(&id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    // Blob before row, mirroring the create order. A catalog row must never
    // outlive a successful blob delete.
    state
        .storage
        .delete(&row.public_id)
        .await
        .map_err(AppError::Storage)?;

    sqlx::query("DELETE FROM images WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    tracing::info!(image_id = %id, key = %row.public_id, "image deleted");

    Ok(Json(SuccessResponse::ok()))
}
