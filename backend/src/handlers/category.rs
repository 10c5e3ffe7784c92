//! HTTP handlers for category endpoints (admin)

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::models::{Category, CategoryWithCount};
use shared::types::Role;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_role, CurrentUser};
use crate::services::category::{CategoryInput, CategoryService};
use crate::AppState;

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = CategoryService::new(state.db);
    let category = service.create(input).await?;
    Ok(Json(category))
}

/// List categories with product counts
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<CategoryWithCount>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list().await?;
    Ok(Json(categories))
}

/// Rename a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = CategoryService::new(state.db);
    let category = service.update(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = CategoryService::new(state.db);
    service.delete(category_id).await?;
    Ok(Json(()))
}

/// Export categories as CSV
pub async fn export_categories_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    require_role(&current_user.0, Role::Admin)?;
    let service = CategoryService::new(state.db);
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"categories.csv\"",
            ),
        ],
        csv,
    ))
}

/// Upload a category image (multipart, field "image")
pub async fn upload_category_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, Role::Admin)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
            let service = CategoryService::new(state.db);
            service.set_image(category_id, bytes.to_vec()).await?;
            return Ok(Json(()));
        }
    }

    Err(AppError::Validation {
        field: "image".to_string(),
        message: "Missing image field".to_string(),
        message_id: "Berkas gambar tidak ditemukan".to_string(),
    })
}

/// Serve a category image
pub async fn get_category_image(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let bytes = service.get_image(category_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
