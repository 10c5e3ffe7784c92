//! Product master data service

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{Product, ProductUnit, ProductWithUnits};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_amount;

use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, product_code, barcode, name, description, price, cost_price, \
     stock, category_id, supplier_id, (image IS NOT NULL) AS has_image, created_at, updated_at";

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub stock: i64,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub stock: Option<i64>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Listing filters for the admin product screen
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product with a generated product code
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
                message_id: "Nama produk wajib diisi".to_string(),
            });
        }
        for (field, amount) in [("price", input.price), ("cost_price", input.cost_price)] {
            validate_amount(amount).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
                message_id: "Harga tidak boleh negatif".to_string(),
            })?;
        }
        if input.stock < 0 {
            return Err(AppError::Validation {
                field: "stock".to_string(),
                message: "Stock cannot be negative".to_string(),
                message_id: "Stok tidak boleh negatif".to_string(),
            });
        }

        if let Some(barcode) = &input.barcode {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE barcode = $1)",
            )
            .bind(barcode)
            .fetch_one(&self.db)
            .await?;
            if exists {
                return Err(AppError::DuplicateEntry("barcode".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        let product_code = next_product_code(&mut tx).await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                product_code, barcode, name, description, price, cost_price,
                stock, category_id, supplier_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product_code)
        .bind(&input.barcode)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Get a single product with its units
    pub async fn get(&self, product_id: Uuid) -> AppResult<ProductWithUnits> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

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

        Ok(ProductWithUnits { product, units })
    }

    /// Paginated product listing with optional search and category filter
    pub async fn list(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Product>> {
        let search = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", s.trim()));
        let offset = (pagination.page.saturating_sub(1) as i64) * pagination.per_page as i64;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR product_code ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
            "#,
        )
        .bind(&search)
        .bind(filter.category_id)
        .fetch_one(&self.db)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR product_code ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(filter.category_id)
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: products,
            pagination: PaginationMeta::new(pagination.page, pagination.per_page, total as u64),
        })
    }

    /// Cashier product search by name, code or barcode
    pub async fn search(&self, query: &str) -> AppResult<Vec<ProductWithUnits>> {
        let pattern = format!("%{}%", query.trim());
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE name ILIKE $1 OR product_code ILIKE $1 OR barcode ILIKE $1
            ORDER BY name
            LIMIT 20
            "#
        ))
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        self.attach_units(products).await
    }

    /// Products in a category, with their units
    pub async fn by_category(&self, category_id: Uuid) -> AppResult<Vec<ProductWithUnits>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.db)
        .await?;

        self.attach_units(products).await
    }

    /// Update a product
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(price) = input.price {
            validate_amount(price).map_err(|e| AppError::Validation {
                field: "price".to_string(),
                message: e.to_string(),
                message_id: "Harga tidak boleh negatif".to_string(),
            })?;
        }
        if matches!(input.stock, Some(s) if s < 0) {
            return Err(AppError::Validation {
                field: "stock".to_string(),
                message: "Stock cannot be negative".to_string(),
                message_id: "Stok tidak boleh negatif".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                barcode = COALESCE($3, barcode),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                cost_price = COALESCE($6, cost_price),
                stock = COALESCE($7, stock),
                category_id = COALESCE($8, category_id),
                supplier_id = COALESCE($9, supplier_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.barcode)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        // Unit prices follow the base price, so a price change cascades.
        if input.price.is_some() {
            sqlx::query(
                "UPDATE product_units SET price = $1 * multiplier WHERE product_id = $2",
            )
            .bind(product.price)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    /// Store or replace a product's image bytes
    pub async fn set_image(&self, product_id: Uuid, bytes: Vec<u8>) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE products SET image = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(&bytes)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// Fetch a product's image bytes
    pub async fn get_image(&self, product_id: Uuid) -> AppResult<Vec<u8>> {
        let image: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT image FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        image.ok_or_else(|| AppError::NotFound("Product image".to_string()))
    }

    /// Delete a product
    ///
    /// Products referenced by order lines are kept for history and cannot be
    /// removed.
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::InvalidReference(
                "Product has order history and cannot be deleted".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// Export the full product list as CSV
    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_code"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "product_code",
                "barcode",
                "name",
                "price",
                "cost_price",
                "stock",
            ])
            .map_err(|e| AppError::Internal(e.to_string()))?;

        for p in &products {
            writer
                .write_record([
                    p.product_code.as_str(),
                    p.barcode.as_deref().unwrap_or(""),
                    p.name.as_str(),
                    &p.price.to_string(),
                    &p.cost_price.to_string(),
                    &p.stock.to_string(),
                ])
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn attach_units(&self, products: Vec<Product>) -> AppResult<Vec<ProductWithUnits>> {
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
}

/// Allocate the next product code: NUKA- followed by a 4-digit sequence
///
/// Numbers come from a dedicated database sequence, so deleting a product
/// never frees a number for reuse against the UNIQUE product_code constraint,
/// and concurrent creates always draw distinct codes.
async fn next_product_code(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> AppResult<String> {
    let seq = sqlx::query_scalar::<_, i64>("SELECT nextval('product_code_seq')")
        .fetch_one(&mut **tx)
        .await?;

    Ok(format_product_code(seq))
}

fn format_product_code(seq: i64) -> String {
    format!("NUKA-{:04}", seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_code_format() {
        assert_eq!(format_product_code(7), "NUKA-0007");
        assert_eq!(format_product_code(42), "NUKA-0042");
    }

    /// Codes track an ever-increasing sequence, not the row count, so a
    /// deleted product never causes the next create to re-issue its number
    #[test]
    fn deleted_products_never_free_their_code() {
        let mut next_seq = 0i64;
        let mut issued: Vec<String> = (0..5)
            .map(|_| {
                next_seq += 1;
                format_product_code(next_seq)
            })
            .collect();
        assert_eq!(issued.last().unwrap(), "NUKA-0005");

        // Delete one of the five, then create another.
        issued.remove(2);
        next_seq += 1;
        let next = format_product_code(next_seq);

        assert_eq!(next, "NUKA-0006");
        assert!(!issued.contains(&next));
    }
}
