//! HTTP handlers for cashier checkout endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Order, OrderWithItems, ProductWithUnits};
use shared::types::Role;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::order::{OrderOrigin, OrderService, PlaceOrderInput};
use crate::services::product::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Cashier checkout: place and settle an order in one step
pub async fn cashier_checkout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, Role::Kasir)?;
    let service = OrderService::new(state.db);
    let order = service
        .place_order(current_user.0.user_id, input, OrderOrigin::Cashier)
        .await?;
    Ok(Json(order))
}

/// The cashier's own recent orders
pub async fn cashier_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    require_role(&current_user.0, Role::Kasir)?;
    let service = OrderService::new(state.db);
    let orders = service.orders_for_user(current_user.0.user_id).await?;
    Ok(Json(orders))
}

/// Search products by name, code, or barcode
pub async fn search_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ProductWithUnits>>> {
    require_role(&current_user.0, Role::Kasir)?;
    let service = ProductService::new(state.db);
    let products = service.search(&query.q).await?;
    Ok(Json(products))
}

/// Products in a category, for the cashier screen
pub async fn products_by_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductWithUnits>>> {
    require_role(&current_user.0, Role::Kasir)?;
    let service = ProductService::new(state.db);
    let products = service.by_category(category_id).await?;
    Ok(Json(products))
}
