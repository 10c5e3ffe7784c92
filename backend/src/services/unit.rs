//! Product unit service
//!
//! Units are named packaging multiples of a product (e.g. "Dus" = 40 pcs).
//! The unit price is always derived from the product's base price times the
//! multiplier; it is never accepted from the caller.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::ProductUnit;
use shared::validation::validate_multiplier;

use crate::error::{AppError, AppResult};

/// Product unit service
#[derive(Clone)]
pub struct UnitService {
    db: PgPool,
}

/// Input for creating a product unit
#[derive(Debug, Deserialize)]
pub struct CreateUnitInput {
    pub product_id: Uuid,
    pub unit_name: String,
    pub multiplier: i64,
}

/// Input for updating a product unit
#[derive(Debug, Deserialize)]
pub struct UpdateUnitInput {
    pub unit_name: Option<String>,
    pub multiplier: Option<i64>,
}

impl UnitService {
    /// Create a new UnitService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a unit for a product
    pub async fn create(&self, input: CreateUnitInput) -> AppResult<ProductUnit> {
        validate_multiplier(input.multiplier).map_err(|e| AppError::Validation {
            field: "multiplier".to_string(),
            message: e.to_string(),
            message_id: "Pengali satuan minimal 1".to_string(),
        })?;
        if input.unit_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "unit_name".to_string(),
                message: "Unit name is required".to_string(),
                message_id: "Nama satuan wajib diisi".to_string(),
            });
        }

        let base_price = sqlx::query_scalar::<_, rust_decimal::Decimal>(
            "SELECT price FROM products WHERE id = $1",
        )
        .bind(input.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let unit = sqlx::query_as::<_, ProductUnit>(
            r#"
            INSERT INTO product_units (product_id, unit_name, multiplier, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, unit_name, multiplier, price, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.unit_name.trim())
        .bind(input.multiplier)
        .bind(base_price * rust_decimal::Decimal::from(input.multiplier))
        .fetch_one(&self.db)
        .await?;

        Ok(unit)
    }

    /// Units for a product
    pub async fn for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductUnit>> {
        let units = sqlx::query_as::<_, ProductUnit>(
            r#"
            SELECT id, product_id, unit_name, multiplier, price, created_at
            FROM product_units
            WHERE product_id = $1
            ORDER BY multiplier
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(units)
    }

    /// Update a unit, re-deriving its price from the base price
    pub async fn update(&self, unit_id: Uuid, input: UpdateUnitInput) -> AppResult<ProductUnit> {
        if let Some(multiplier) = input.multiplier {
            validate_multiplier(multiplier).map_err(|e| AppError::Validation {
                field: "multiplier".to_string(),
                message: e.to_string(),
                message_id: "Pengali satuan minimal 1".to_string(),
            })?;
        }

        let unit = sqlx::query_as::<_, ProductUnit>(
            r#"
            UPDATE product_units pu SET
                unit_name = COALESCE($2, pu.unit_name),
                multiplier = COALESCE($3, pu.multiplier),
                price = p.price * COALESCE($3, pu.multiplier)
            FROM products p
            WHERE pu.id = $1 AND p.id = pu.product_id
            RETURNING pu.id, pu.product_id, pu.unit_name, pu.multiplier, pu.price, pu.created_at
            "#,
        )
        .bind(unit_id)
        .bind(&input.unit_name)
        .bind(input.multiplier)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product unit".to_string()))?;

        Ok(unit)
    }

    /// Delete a unit
    ///
    /// Units referenced by order lines are kept for history.
    pub async fn delete(&self, unit_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM order_items WHERE unit_id = $1)",
        )
        .bind(unit_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::InvalidReference(
                "Unit has order history and cannot be deleted".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM product_units WHERE id = $1")
            .bind(unit_id)
            .execute(&self.db)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Product unit".to_string()));
        }
        Ok(())
    }
}
