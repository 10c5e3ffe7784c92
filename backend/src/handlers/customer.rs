//! HTTP handlers for customer self-service endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use shared::models::{Order, OrderWithItems, ProductWithUnits};
use shared::types::Role;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::order::{OrderOrigin, OrderService, PlaceOrderInput};
use crate::AppState;

/// In-stock products with their units, the customer catalog
pub async fn customer_catalog(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductWithUnits>>> {
    require_role(&current_user.0, Role::Pelanggan)?;
    let service = OrderService::new(state.db);
    let products = service.in_stock_products().await?;
    Ok(Json(products))
}

/// Place a self-service order; created PENDING with a pickup code
pub async fn customer_place_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, Role::Pelanggan)?;
    let service = OrderService::new(state.db);
    let order = service
        .place_order(current_user.0.user_id, input, OrderOrigin::Customer)
        .await?;
    Ok(Json(order))
}

/// The customer's own orders
pub async fn customer_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    require_role(&current_user.0, Role::Pelanggan)?;
    let service = OrderService::new(state.db);
    let orders = service.orders_for_user(current_user.0.user_id).await?;
    Ok(Json(orders))
}

/// Look up an order by its pickup code (cashier settles it at the counter)
pub async fn order_by_pickup_code(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(pickup_code): Path<String>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, Role::Kasir)?;
    let service = OrderService::new(state.db);
    let order = service.get_by_pickup_code(&pickup_code).await?;
    Ok(Json(order))
}
