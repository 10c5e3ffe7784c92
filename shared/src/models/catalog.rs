//! Master data models: products, units, categories, suppliers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sellable product
///
/// Stock is denominated in base units (pcs). The stored image bytes are not
/// carried on the model; listings only expose whether an image exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    /// Generated code, e.g. "NUKA-0001"
    pub product_code: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Selling price for one base unit
    pub price: Decimal,
    pub cost_price: Decimal,
    /// On-hand stock in base units; never negative after a committed order
    pub stock: i64,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named packaging multiple of a product (e.g. "Dus" = 40 pcs)
///
/// The unit price is derived from the product's base price at create/update
/// time and snapshotted onto order lines; it is never taken from user input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductUnit {
    pub id: Uuid,
    pub product_id: Uuid,
    pub unit_name: String,
    /// How many base units one of this unit represents (>= 1)
    pub multiplier: i64,
    /// Price for one of this unit (base price x multiplier)
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
}

/// Category with its product count, for admin listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryWithCount {
    pub id: Uuid,
    pub name: String,
    pub has_image: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Supplier master data
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Product together with its units, for the customer-facing catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithUnits {
    #[serde(flatten)]
    pub product: Product,
    pub units: Vec<ProductUnit>,
}
