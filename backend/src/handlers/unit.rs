//! HTTP handlers for product unit endpoints (admin)

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::ProductUnit;
use shared::types::Role;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::unit::{CreateUnitInput, UnitService, UpdateUnitInput};
use crate::AppState;

/// Create a product unit
pub async fn create_unit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUnitInput>,
) -> AppResult<Json<ProductUnit>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UnitService::new(state.db);
    let unit = service.create(input).await?;
    Ok(Json(unit))
}

/// List units for a product
pub async fn list_units_for_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductUnit>>> {
    let service = UnitService::new(state.db);
    let units = service.for_product(product_id).await?;
    Ok(Json(units))
}

/// Update a product unit
pub async fn update_unit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<Uuid>,
    Json(input): Json<UpdateUnitInput>,
) -> AppResult<Json<ProductUnit>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UnitService::new(state.db);
    let unit = service.update(unit_id, input).await?;
    Ok(Json(unit))
}

/// Delete a product unit
pub async fn delete_unit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UnitService::new(state.db);
    service.delete(unit_id).await?;
    Ok(Json(()))
}
