//! Admin dashboard service

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::Product;

use crate::error::AppResult;

const LOW_STOCK_THRESHOLD: i64 = 10;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Headline figures for the admin dashboard
#[derive(Debug, Serialize, FromRow)]
pub struct DashboardStats {
    pub revenue_today: Decimal,
    pub orders_today: i64,
    pub pending_orders: i64,
    pub product_count: i64,
    pub low_stock_count: i64,
    /// Customer accounts registered since the start of the current year
    pub new_customers: i64,
}

/// A top-selling product over the last 30 days
#[derive(Debug, Serialize, FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// One payment method's slice of this year's completed orders
#[derive(Debug, Serialize)]
pub struct PaymentShare {
    pub payment_method: Option<String>,
    pub order_count: i64,
    pub share_percent: Decimal,
}

#[derive(Debug, FromRow)]
struct PaymentCountRow {
    payment_method: Option<String>,
    order_count: i64,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Headline figures
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                COALESCE((SELECT SUM(total) FROM orders
                          WHERE status = 'COMPLETED'
                            AND created_at::date = CURRENT_DATE), 0) AS revenue_today,
                (SELECT COUNT(*) FROM orders
                 WHERE status = 'COMPLETED'
                   AND created_at::date = CURRENT_DATE) AS orders_today,
                (SELECT COUNT(*) FROM orders WHERE status = 'PENDING') AS pending_orders,
                (SELECT COUNT(*) FROM products) AS product_count,
                (SELECT COUNT(*) FROM products WHERE stock <= $1) AS low_stock_count,
                (SELECT COUNT(*) FROM users
                 WHERE role = 'PELANGGAN'
                   AND created_at >= date_trunc('year', NOW())) AS new_customers
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }

    /// Top-selling products over the last 30 days
    pub async fn top_products(&self, limit: i64) -> AppResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   COALESCE(SUM(oi.quantity), 0)::bigint AS quantity_sold,
                   COALESCE(SUM(oi.subtotal), 0) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE o.status = 'COMPLETED'
              AND o.created_at >= NOW() - INTERVAL '30 days'
            GROUP BY p.id, p.name
            ORDER BY quantity_sold DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Share of this year's completed orders per payment method
    pub async fn payment_method_shares(&self) -> AppResult<Vec<PaymentShare>> {
        let counts = sqlx::query_as::<_, PaymentCountRow>(
            r#"
            SELECT payment_method::text AS payment_method,
                   COUNT(*) AS order_count
            FROM orders
            WHERE status = 'COMPLETED'
              AND created_at >= date_trunc('year', NOW())
            GROUP BY payment_method
            ORDER BY order_count DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(compute_shares(counts))
    }

    /// Products added in the last 14 days, newest first
    pub async fn latest_products(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, product_code, barcode, name, description, price, cost_price,
                   stock, category_id, supplier_id, (image IS NOT NULL) AS has_image,
                   created_at, updated_at
            FROM products
            WHERE created_at >= NOW() - INTERVAL '14 days'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }
}

/// Turn per-method order counts into percentage shares of the whole
fn compute_shares(counts: Vec<PaymentCountRow>) -> Vec<PaymentShare> {
    let total: i64 = counts.iter().map(|c| c.order_count).sum();

    counts
        .into_iter()
        .map(|c| {
            let share_percent = if total == 0 {
                Decimal::ZERO
            } else {
                (Decimal::from(c.order_count) * Decimal::ONE_HUNDRED / Decimal::from(total))
                    .round_dp(2)
            };
            PaymentShare {
                payment_method: c.payment_method,
                order_count: c.order_count,
                share_percent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(method: &str, order_count: i64) -> PaymentCountRow {
        PaymentCountRow {
            payment_method: Some(method.to_string()),
            order_count,
        }
    }

    #[test]
    fn shares_are_percentages_of_the_total() {
        let shares = compute_shares(vec![row("CASH", 3), row("QRIS", 1)]);

        assert_eq!(shares[0].share_percent, Decimal::from(75));
        assert_eq!(shares[1].share_percent, Decimal::from(25));
        let sum: Decimal = shares.iter().map(|s| s.share_percent).sum();
        assert_eq!(sum, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn shares_round_to_two_decimals() {
        let shares = compute_shares(vec![row("CASH", 1), row("DEBIT", 1), row("QRIS", 1)]);

        for share in &shares {
            assert_eq!(share.share_percent, Decimal::new(3333, 2));
        }
    }

    #[test]
    fn empty_counts_produce_no_shares() {
        assert!(compute_shares(Vec::new()).is_empty());
    }
}
