//! HTTP handlers for admin order management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{Order, OrderWithItems};
use shared::types::{PaymentMethod, Role};

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::order::{OrderService, UpdateStatusInput};
use crate::AppState;

/// Most recent orders across all users
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = OrderService::new(state.db);
    let orders = service.list_recent().await?;
    Ok(Json(orders))
}

/// Get one order with its items
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Transition an order's status (complete or cancel a pending order)
pub async fn update_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Order>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = OrderService::new(state.db);
    let order = service.update_status(order_id, input.status).await?;
    Ok(Json(order))
}

/// The fixed set of supported payment methods
pub async fn list_payment_methods(
    _current_user: CurrentUser,
) -> Json<Vec<PaymentMethod>> {
    Json(PaymentMethod::ALL.to_vec())
}
