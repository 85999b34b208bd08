use crate::api::error::AppError;
use crate::models::{ImageRecord, ImageRow, ImageStatus, Project};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ProjectResponse {
    pub project: Project,
    pub images: Vec<ImageRecord>,
}

#[utoipa::path(
    get,
    path = "/project/{project_id}",
    params(("project_id" = String, Path, description = "Customer-derived project key")),
    responses(
        (status = 200, description = "Derived project view", body = ProjectResponse),
        (status = 404, description = "No published images for this project")
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<crate::AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let rows: Vec<ImageRow> = sqlx::query_as(
        "SELECT id, public_id, image_url, customer_number, customer_name, phone, category, \
         tags, description, status, project_id, uploaded_at, updated_at \
         FROM images WHERE project_id = ? AND status = ? ORDER BY category, uploaded_at DESC",
    )
    .bind(&project_id)
    .bind(ImageStatus::Published)
    .fetch_all(&state.db)
    .await?;

    if rows.is_empty() {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    let images: Vec<ImageRecord> = rows.into_iter().map(Into::into).collect();

    // The first row (first category, most recent upload within it) stands in
    // for the whole project's customer fields.
    let representative = &images[0];

    let mut categories = Vec::new();
    let mut images_by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for image in &images {
        images_by_category
            .entry(image.category.clone())
            .or_insert_with(|| {
                categories.push(image.category.clone());
                Vec::new()
            })
            .push(image.image_url.clone());
    }

    let description = if representative.description.is_empty() {
        format!("Project for {}", representative.customer_name)
    } else {
        representative.description.clone()
    };

    let project = Project {
        id: project_id,
        customer_number: representative.customer_number.clone(),
        customer_name: representative.customer_name.clone(),
        phone: representative.phone.clone(),
        description,
        categories,
        images_by_category,
        all_images: images.iter().map(|img| img.image_url.clone()).collect(),
        year: representative.uploaded_at.year().to_string(),
    };

    Ok(Json(ProjectResponse { project, images }))
}
