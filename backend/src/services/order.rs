//! Order service: checkout, order lookup and status transitions
//!
//! Checkout resolves each line against live product/unit rows, prices it with
//! the shared pricing engine, and decrements stock, all inside a single
//! database transaction. Product rows are locked with FOR UPDATE and the
//! decrement itself is guarded with a stock predicate, so concurrent orders
//! for the same product either both fit or one of them rolls back untouched.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{Order, OrderItemDetail, OrderWithItems, ProductUnit, ProductWithUnits};
use shared::pricing::{self, OrderAdjustment, PricedLine};
use shared::types::{OrderStatus, PaymentMethod};
use shared::validation::{validate_percent, validate_quantity};

use crate::error::{AppError, AppResult};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Where an order is being placed from
///
/// Cashier checkout settles immediately; customer self-service orders are
/// created PENDING with a pickup code and settled at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOrigin {
    Cashier,
    Customer,
}

/// One requested order line
///
/// A product is referenced by barcode (cashier scanning) or by id (customer
/// catalog); when both are present the barcode wins.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Option<Uuid>,
    pub barcode: Option<String>,
    pub unit_id: Uuid,
    pub quantity: i64,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discount_value: Decimal,
}

/// Input for placing an order
#[derive(Debug, Deserialize)]
pub struct PlaceOrderInput {
    pub lines: Vec<OrderLineInput>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default)]
    pub tax_value: Decimal,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Input for changing an order's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: OrderStatus,
}

/// Product row as locked during checkout
#[derive(Debug, sqlx::FromRow)]
struct CheckoutProductRow {
    id: Uuid,
    name: String,
    stock: i64,
}

/// Resolved line, priced and ready to persist
struct ResolvedLine {
    product_id: Uuid,
    unit_id: Uuid,
    priced: PricedLine,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place an order for the given user
    ///
    /// Any failure (unknown product/unit, unit belonging to another product,
    /// insufficient stock, pricing range violation) rolls the whole
    /// transaction back: no stock moves and no order row is written.
    pub async fn place_order(
        &self,
        user_id: Uuid,
        input: PlaceOrderInput,
        origin: OrderOrigin,
    ) -> AppResult<OrderWithItems> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "Order must contain at least one line".to_string(),
                message_id: "Pesanan harus berisi minimal satu barang".to_string(),
            });
        }

        for line in &input.lines {
            validate_quantity(line.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_id: "Jumlah minimal 1".to_string(),
            })?;
            validate_percent(line.discount_percent).map_err(|e| AppError::Validation {
                field: "discount_percent".to_string(),
                message: e.to_string(),
                message_id: "Persentase harus antara 0 dan 100".to_string(),
            })?;
        }
        for (field, percent) in [
            ("discount_percent", input.discount_percent),
            ("tax_percent", input.tax_percent),
        ] {
            validate_percent(percent).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
                message_id: "Persentase harus antara 0 dan 100".to_string(),
            })?;
        }

        let adjustment = OrderAdjustment {
            discount_percent: input.discount_percent,
            discount_value: input.discount_value,
            tax_percent: input.tax_percent,
            tax_value: input.tax_value,
        };

        let mut tx = self.db.begin().await?;

        let mut resolved: Vec<ResolvedLine> = Vec::with_capacity(input.lines.len());
        let mut subtotal = Decimal::ZERO;

        for line in &input.lines {
            let product = self.lock_product(&mut tx, line).await?;

            let unit = sqlx::query_as::<_, ProductUnit>(
                r#"
                SELECT id, product_id, unit_name, multiplier, price, created_at
                FROM product_units
                WHERE id = $1
                "#,
            )
            .bind(line.unit_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product unit".to_string()))?;

            if unit.product_id != product.id {
                return Err(AppError::InvalidReference(format!(
                    "Unit '{}' does not belong to product '{}'",
                    unit.unit_name, product.name
                )));
            }

            let priced = pricing::price_line(
                unit.price,
                unit.multiplier,
                line.quantity,
                line.discount_percent,
                line.discount_value,
            )
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

            if product.stock < priced.required_base_stock {
                return Err(AppError::InsufficientStock(format!(
                    "Product '{}' has {} in stock, {} required",
                    product.name, product.stock, priced.required_base_stock
                )));
            }

            // Guarded decrement; the predicate re-checks stock so a competing
            // order that slipped between lock and update cannot drive it
            // negative.
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $1, updated_at = NOW() \
                 WHERE id = $2 AND stock >= $1",
            )
            .bind(priced.required_base_stock)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::InsufficientStock(format!(
                    "Product '{}' ran out of stock",
                    product.name
                )));
            }

            subtotal += priced.subtotal;
            resolved.push(ResolvedLine {
                product_id: product.id,
                unit_id: unit.id,
                priced,
            });
        }

        let totals = pricing::order_totals(subtotal, &adjustment)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let transaction_code = next_transaction_code(&mut tx).await?;
        let (status, pickup_code) = match origin {
            OrderOrigin::Cashier => (OrderStatus::Completed, None),
            OrderOrigin::Customer => (OrderStatus::Pending, Some(generate_pickup_code())),
        };

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                user_id, transaction_code, pickup_code, customer_name, customer_phone,
                payment_method, subtotal, discount_percent, discount_value,
                tax_percent, tax_value, total, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, user_id, transaction_code, pickup_code, customer_name,
                      customer_phone, payment_method, subtotal, discount_percent,
                      discount_value, tax_percent, tax_value, total, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(&transaction_code)
        .bind(&pickup_code)
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.payment_method)
        .bind(totals.subtotal)
        .bind(totals.discount_percent)
        .bind(totals.discount_value)
        .bind(totals.tax_percent)
        .bind(totals.tax_value)
        .bind(totals.total)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        for line in &resolved {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, unit_id, quantity, unit_price,
                    unit_multiplier, discount_percent, discount_value, subtotal
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.unit_id)
            .bind(line.priced.quantity)
            .bind(line.priced.unit_price)
            .bind(line.priced.unit_multiplier)
            .bind(line.priced.discount_percent)
            .bind(line.priced.discount_value)
            .bind(line.priced.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            transaction_code = %order.transaction_code,
            total = %order.total,
            lines = resolved.len(),
            "order placed"
        );

        let items = self.order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Lock the product row for a line, resolving by barcode first
    async fn lock_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: &OrderLineInput,
    ) -> AppResult<CheckoutProductRow> {
        let row = if let Some(barcode) = &line.barcode {
            sqlx::query_as::<_, CheckoutProductRow>(
                "SELECT id, name, stock FROM products WHERE barcode = $1 FOR UPDATE",
            )
            .bind(barcode)
            .fetch_optional(&mut **tx)
            .await?
        } else if let Some(product_id) = line.product_id {
            sqlx::query_as::<_, CheckoutProductRow>(
                "SELECT id, name, stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?
        } else {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "Each line needs a product id or barcode".to_string(),
                message_id: "Setiap barang harus memiliki id produk atau barcode".to_string(),
            });
        };

        row.ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Get a single order with its items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, transaction_code, pickup_code, customer_name,
                   customer_phone, payment_method, subtotal, discount_percent,
                   discount_value, tax_percent, tax_value, total, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = self.order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Look up a self-service order by its pickup code
    pub async fn get_by_pickup_code(&self, pickup_code: &str) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, transaction_code, pickup_code, customer_name,
                   customer_phone, payment_method, subtotal, discount_percent,
                   discount_value, tax_percent, tax_value, total, status, created_at
            FROM orders
            WHERE pickup_code = $1
            "#,
        )
        .bind(pickup_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = self.order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Orders placed by one user, most recent first
    pub async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, transaction_code, pickup_code, customer_name,
                   customer_phone, payment_method, subtotal, discount_percent,
                   discount_value, tax_percent, tax_value, total, status, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Most recent orders across all users, for the admin order screen
    pub async fn list_recent(&self) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, transaction_code, pickup_code, customer_name,
                   customer_phone, payment_method, subtotal, discount_percent,
                   discount_value, tax_percent, tax_value, total, status, created_at
            FROM orders
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Transition an order's status
    ///
    /// Only PENDING orders may move; settled orders are immutable.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        if current != OrderStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "order is already {}",
                current.as_str()
            )));
        }

        // Cancelling a pending order returns the reserved stock.
        if new_status == OrderStatus::Cancelled {
            sqlx::query(
                r#"
                UPDATE products p
                SET stock = p.stock + oi.quantity * oi.unit_multiplier,
                    updated_at = NOW()
                FROM order_items oi
                WHERE oi.order_id = $1 AND oi.product_id = p.id
                "#,
            )
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2
            WHERE id = $1
            RETURNING id, user_id, transaction_code, pickup_code, customer_name,
                      customer_phone, payment_method, subtotal, discount_percent,
                      discount_value, tax_percent, tax_value, total, status, created_at
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Products with stock on hand, with their units, for the customer catalog
    pub async fn in_stock_products(&self) -> AppResult<Vec<ProductWithUnits>> {
        let products = sqlx::query_as::<_, shared::models::Product>(
            r#"
            SELECT id, product_code, barcode, name, description, price, cost_price,
                   stock, category_id, supplier_id, (image IS NOT NULL) AS has_image,
                   created_at, updated_at
            FROM products
            WHERE stock > 0
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut result = Vec::with_capacity(products.len());
        for product in products {
            let units = sqlx::query_as::<_, ProductUnit>(
                r#"
                SELECT id, product_id, unit_name, multiplier, price, created_at
                FROM product_units
                WHERE product_id = $1
                ORDER BY multiplier
                "#,
            )
            .bind(product.id)
            .fetch_all(&self.db)
            .await?;

            result.push(ProductWithUnits { product, units });
        }

        Ok(result)
    }

    async fn order_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItemDetail>> {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
                   oi.unit_id, pu.unit_name, oi.quantity, oi.unit_price,
                   oi.unit_multiplier, oi.discount_percent, oi.discount_value,
                   oi.subtotal
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            JOIN product_units pu ON pu.id = oi.unit_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }
}

/// Allocate the next transaction code: TRX + yyyymmdd + 4-digit daily sequence
///
/// The daily counter row is upserted and read back in one statement, so two
/// orders committing at the same moment are handed distinct suffixes and the
/// UNIQUE constraint on transaction_code never fires.
async fn next_transaction_code(tx: &mut Transaction<'_, Postgres>) -> AppResult<String> {
    let today = Utc::now().date_naive();
    let seq = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO order_code_counters (day, last_value)
        VALUES ($1, 1)
        ON CONFLICT (day) DO UPDATE
        SET last_value = order_code_counters.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(today)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_transaction_code(today, seq))
}

fn format_transaction_code(day: NaiveDate, seq: i64) -> String {
    format!("TRX{}{:04}", day.format("%Y%m%d"), seq)
}

/// Generate an 8-character uppercase hex pickup code
fn generate_pickup_code() -> String {
    let bytes: [u8; 4] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_code_format() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(format_transaction_code(day, 1), "TRX202608270001");
        assert_eq!(format_transaction_code(day, 123), "TRX202608270123");
    }

    /// Codes come from a shared counter, so simultaneous allocations can
    /// never collide the way a committed-row count would
    #[test]
    fn concurrent_code_allocations_stay_distinct() {
        use std::sync::atomic::{AtomicI64, Ordering};
        use std::sync::Arc;

        let counter = Arc::new(AtomicI64::new(0));
        let day = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| {
                            let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;
                            format_transaction_code(day, seq)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 200);
    }

    #[test]
    fn pickup_code_is_eight_hex_chars() {
        for _ in 0..20 {
            let code = generate_pickup_code();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
            assert!(code.chars().all(|c| !c.is_ascii_lowercase()));
        }
    }
}
