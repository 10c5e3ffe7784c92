//! Sales reporting service
//!
//! All reports aggregate COMPLETED orders only; pending and cancelled orders
//! never contribute to revenue figures. Every ranged report accepts the same
//! optional filters: date range, cashier, and payment method.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::Order;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, PaymentMethod};

use crate::error::AppResult;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Optional filters shared by every ranged report
///
/// All fields may be omitted; an empty filter covers all completed orders.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cashier_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
}

/// Overall sales summary for a period
#[derive(Debug, Serialize, FromRow)]
pub struct SalesSummary {
    pub order_count: i64,
    pub gross_revenue: Decimal,
    pub total_discount: Decimal,
    pub total_tax: Decimal,
    pub items_sold: i64,
}

/// Revenue for one day
#[derive(Debug, Serialize, FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub order_count: i64,
    pub revenue: Decimal,
}

/// Revenue broken down by payment method
#[derive(Debug, Serialize, FromRow)]
pub struct PaymentMethodSales {
    pub payment_method: Option<String>,
    pub order_count: i64,
    pub revenue: Decimal,
}

/// Sales per product
#[derive(Debug, Serialize, FromRow)]
pub struct ProductSales {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity_sold: i64,
    pub base_units_sold: i64,
    pub revenue: Decimal,
}

/// Sales per cashier
#[derive(Debug, Serialize, FromRow)]
pub struct CashierSales {
    pub user_id: Uuid,
    pub username: String,
    pub order_count: i64,
    pub revenue: Decimal,
}

/// Sales per category
#[derive(Debug, Serialize, FromRow)]
pub struct CategorySales {
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub base_units_sold: i64,
    pub revenue: Decimal,
}

/// Revenue per month of one year
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlySales {
    pub month: i32,
    pub order_count: i64,
    pub revenue: Decimal,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Overall summary for a period
    pub async fn summary(&self, filter: &ReportFilter) -> AppResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT COUNT(*) AS order_count,
                   COALESCE(SUM(total), 0) AS gross_revenue,
                   COALESCE(SUM(discount_value), 0) AS total_discount,
                   COALESCE(SUM(tax_value), 0) AS total_tax,
                   COALESCE((
                       SELECT SUM(oi.quantity)
                       FROM order_items oi
                       JOIN orders o2 ON o2.id = oi.order_id
                       WHERE o2.status = 'COMPLETED'
                         AND ($1::date IS NULL OR o2.created_at::date >= $1)
                         AND ($2::date IS NULL OR o2.created_at::date <= $2)
                         AND ($3::uuid IS NULL OR o2.user_id = $3)
                         AND ($4::payment_method IS NULL OR o2.payment_method = $4)
                   ), 0)::bigint AS items_sold
            FROM orders
            WHERE status = 'COMPLETED'
              AND ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::payment_method IS NULL OR payment_method = $4)
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }

    /// Revenue per day over a period
    pub async fn daily(&self, filter: &ReportFilter) -> AppResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total), 0) AS revenue
            FROM orders
            WHERE status = 'COMPLETED'
              AND ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::payment_method IS NULL OR payment_method = $4)
            GROUP BY created_at::date
            ORDER BY day
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Revenue per payment method over a period
    pub async fn by_payment_method(
        &self,
        filter: &ReportFilter,
    ) -> AppResult<Vec<PaymentMethodSales>> {
        let rows = sqlx::query_as::<_, PaymentMethodSales>(
            r#"
            SELECT payment_method::text AS payment_method,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total), 0) AS revenue
            FROM orders
            WHERE status = 'COMPLETED'
              AND ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::payment_method IS NULL OR payment_method = $4)
            GROUP BY payment_method
            ORDER BY revenue DESC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Completed transactions over a period, paginated with optional search
    /// on the transaction code
    pub async fn transactions(
        &self,
        filter: &ReportFilter,
        search: Option<&str>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Order>> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let offset = (pagination.page.saturating_sub(1) as i64) * pagination.per_page as i64;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE status = 'COMPLETED'
              AND ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::payment_method IS NULL OR payment_method = $4)
              AND ($5::text IS NULL OR transaction_code ILIKE $5)
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, transaction_code, pickup_code, customer_name,
                   customer_phone, payment_method, subtotal, discount_percent,
                   discount_value, tax_percent, tax_value, total, status, created_at
            FROM orders
            WHERE status = 'COMPLETED'
              AND ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::payment_method IS NULL OR payment_method = $4)
              AND ($5::text IS NULL OR transaction_code ILIKE $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .bind(&pattern)
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: orders,
            pagination: PaginationMeta::new(pagination.page, pagination.per_page, total as u64),
        })
    }

    /// Sales per product over a period
    pub async fn per_product(&self, filter: &ReportFilter) -> AppResult<Vec<ProductSales>> {
        let rows = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   COALESCE(SUM(oi.quantity), 0)::bigint AS quantity_sold,
                   COALESCE(SUM(oi.quantity * oi.unit_multiplier), 0)::bigint AS base_units_sold,
                   COALESCE(SUM(oi.subtotal), 0) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE o.status = 'COMPLETED'
              AND ($1::date IS NULL OR o.created_at::date >= $1)
              AND ($2::date IS NULL OR o.created_at::date <= $2)
              AND ($3::uuid IS NULL OR o.user_id = $3)
              AND ($4::payment_method IS NULL OR o.payment_method = $4)
            GROUP BY p.id, p.name
            ORDER BY revenue DESC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Sales per cashier over a period
    pub async fn per_cashier(&self, filter: &ReportFilter) -> AppResult<Vec<CashierSales>> {
        let rows = sqlx::query_as::<_, CashierSales>(
            r#"
            SELECT u.id AS user_id, u.username,
                   COUNT(o.id) AS order_count,
                   COALESCE(SUM(o.total), 0) AS revenue
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.status = 'COMPLETED'
              AND ($1::date IS NULL OR o.created_at::date >= $1)
              AND ($2::date IS NULL OR o.created_at::date <= $2)
              AND ($3::uuid IS NULL OR o.user_id = $3)
              AND ($4::payment_method IS NULL OR o.payment_method = $4)
              AND u.role = 'KASIR'
            GROUP BY u.id, u.username
            ORDER BY revenue DESC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Sales per category over a period
    pub async fn per_category(&self, filter: &ReportFilter) -> AppResult<Vec<CategorySales>> {
        let rows = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT c.id AS category_id, c.name AS category_name,
                   COALESCE(SUM(oi.quantity * oi.unit_multiplier), 0)::bigint AS base_units_sold,
                   COALESCE(SUM(oi.subtotal), 0) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE o.status = 'COMPLETED'
              AND ($1::date IS NULL OR o.created_at::date >= $1)
              AND ($2::date IS NULL OR o.created_at::date <= $2)
              AND ($3::uuid IS NULL OR o.user_id = $3)
              AND ($4::payment_method IS NULL OR o.payment_method = $4)
            GROUP BY c.id, c.name
            ORDER BY revenue DESC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.cashier_id)
        .bind(filter.payment_method)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Revenue per month for one year
    pub async fn yearly(&self, year: i32) -> AppResult<Vec<MonthlySales>> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            r#"
            SELECT EXTRACT(MONTH FROM created_at)::int AS month,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total), 0) AS revenue
            FROM orders
            WHERE status = 'COMPLETED'
              AND EXTRACT(YEAR FROM created_at) = $1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_filter_fields_are_all_optional() {
        let filter: ReportFilter = serde_json::from_str("{}").unwrap();
        assert!(filter.start.is_none());
        assert!(filter.end.is_none());
        assert!(filter.cashier_id.is_none());
        assert!(filter.payment_method.is_none());
    }

    #[test]
    fn report_filter_parses_combined_filters() {
        let filter: ReportFilter = serde_json::from_str(
            r#"{"start":"2026-01-01","payment_method":"QRIS"}"#,
        )
        .unwrap();
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert!(filter.end.is_none());
        assert_eq!(filter.payment_method, Some(PaymentMethod::Qris));
    }
}
