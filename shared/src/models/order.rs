//! Order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{OrderStatus, PaymentMethod};

/// A placed order
///
/// Monetary fields are fixed at creation time by the pricing engine; only
/// `status` may change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Human-facing code, e.g. "TRX202608270042"
    pub transaction_code: String,
    /// Self-service orders carry an 8-hex-char pickup code
    pub pickup_code: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    /// Sum of line subtotals before the order-level discount
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_value: Decimal,
    pub tax_percent: Decimal,
    pub tax_value: Decimal,
    /// subtotal - discount + tax
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A persisted order line
///
/// Unit price and multiplier are snapshots taken from the product unit at
/// order time and never re-read later. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub unit_id: Uuid,
    /// Quantity in units of the chosen product unit, not base units
    pub quantity: i64,
    pub unit_price: Decimal,
    pub unit_multiplier: i64,
    pub discount_percent: Decimal,
    pub discount_value: Decimal,
    pub subtotal: Decimal,
}

/// Order line enriched with product/unit names for responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_id: Uuid,
    pub unit_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub unit_multiplier: i64,
    pub discount_percent: Decimal,
    pub discount_value: Decimal,
    pub subtotal: Decimal,
}

/// An order with its line items, as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}
