//! HTTP handlers for admin dashboard endpoints

use axum::{extract::State, Json};

use shared::models::Product;
use shared::types::Role;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::dashboard::{DashboardService, DashboardStats, PaymentShare, TopProduct};
use crate::AppState;

/// Headline figures for the admin dashboard
pub async fn dashboard_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardStats>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = DashboardService::new(state.db);
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Top-selling products over the last 30 days
pub async fn dashboard_top_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TopProduct>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = DashboardService::new(state.db);
    let products = service.top_products(5).await?;
    Ok(Json(products))
}

/// Share of this year's orders per payment method
pub async fn dashboard_payment_shares(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PaymentShare>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = DashboardService::new(state.db);
    let shares = service.payment_method_shares().await?;
    Ok(Json(shares))
}

/// Products added in the last 14 days
pub async fn dashboard_latest_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = DashboardService::new(state.db);
    let products = service.latest_products().await?;
    Ok(Json(products))
}
