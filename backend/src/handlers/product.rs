//! HTTP handlers for product master data endpoints (admin)

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::models::{Product, ProductWithUnits};
use shared::types::{PaginatedResponse, Role};

use crate::error::{AppError, AppResult};
use crate::handlers::pagination;
use crate::middleware::{require_role, CurrentUser};
use crate::services::product::{
    CreateProductInput, ProductFilter, ProductService, UpdateProductInput,
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// List products with pagination, search, and category filter
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    let filter = ProductFilter {
        search: query.search,
        category_id: query.category_id,
    };
    let page = service
        .list(&filter, &pagination(query.page, query.per_page))
        .await?;
    Ok(Json(page))
}

/// Get one product with its units
pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductWithUnits>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    service.delete(product_id).await?;
    Ok(Json(()))
}

/// Upload a product image (multipart, field "image")
pub async fn upload_product_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
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
            let service = ProductService::new(state.db);
            service.set_image(product_id, bytes.to_vec()).await?;
            return Ok(Json(()));
        }
    }

    Err(AppError::Validation {
        field: "image".to_string(),
        message: "Missing image field".to_string(),
        message_id: "Berkas gambar tidak ditemukan".to_string(),
    })
}

/// Serve a product image
pub async fn get_product_image(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ProductService::new(state.db);
    let bytes = service.get_image(product_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// Export products as CSV
pub async fn export_products_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ProductService::new(state.db);
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            ),
        ],
        csv,
    ))
}
