//! HTTP handlers for sales report endpoints (admin)

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use chrono::NaiveDate;

use shared::models::Order;
use shared::types::{PaginatedResponse, PaymentMethod, Role};

use crate::error::AppResult;
use crate::handlers::pagination;
use crate::middleware::{require_role, CurrentUser};
use crate::services::report::{
    CashierSales, CategorySales, DailySales, MonthlySales, PaymentMethodSales, ProductSales,
    ReportFilter, ReportService, SalesSummary,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cashier_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

/// Overall sales summary for a period
pub async fn report_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<SalesSummary>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let summary = service.summary(&filter).await?;
    Ok(Json(summary))
}

/// Revenue per day over a period
pub async fn report_daily(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<DailySales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.daily(&filter).await?;
    Ok(Json(rows))
}

/// Revenue per payment method over a period
pub async fn report_payment_methods(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<PaymentMethodSales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.by_payment_method(&filter).await?;
    Ok(Json(rows))
}

/// Completed transactions, paginated with optional code search
pub async fn report_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TransactionsQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let filter = ReportFilter {
        start: query.start,
        end: query.end,
        cashier_id: query.cashier_id,
        payment_method: query.payment_method,
    };
    let page = service
        .transactions(
            &filter,
            query.search.as_deref(),
            &pagination(query.page, query.per_page),
        )
        .await?;
    Ok(Json(page))
}

/// Sales per product over a period
pub async fn report_per_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<ProductSales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.per_product(&filter).await?;
    Ok(Json(rows))
}

/// Sales per cashier over a period
pub async fn report_per_cashier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<CashierSales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.per_cashier(&filter).await?;
    Ok(Json(rows))
}

/// Sales per category over a period
pub async fn report_per_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<CategorySales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.per_category(&filter).await?;
    Ok(Json(rows))
}

/// Revenue per month for one year
pub async fn report_yearly(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<Vec<MonthlySales>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.yearly(query.year).await?;
    Ok(Json(rows))
}
