//! Supplier master data service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::Supplier;
use shared::validation::validate_phone;

use crate::error::{AppError, AppResult};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier
    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name is required".to_string(),
                message_id: "Nama supplier wajib diisi".to_string(),
            });
        }
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|e| AppError::Validation {
                field: "phone".to_string(),
                message: e.to_string(),
                message_id: "Format nomor telepon tidak valid".to_string(),
            })?;
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, phone, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone, address, created_at
            "#,
        )
        .bind(name)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// All suppliers
    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, address, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Update a supplier
    pub async fn update(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|e| AppError::Validation {
                field: "phone".to_string(),
                message: e.to_string(),
                message_id: "Format nomor telepon tidak valid".to_string(),
            })?;
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address)
            WHERE id = $1
            RETURNING id, name, phone, address, created_at
            "#,
        )
        .bind(supplier_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier)
    }

    /// Delete a supplier; its products are detached, not deleted
    pub async fn delete(&self, supplier_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE products SET supplier_id = NULL WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
