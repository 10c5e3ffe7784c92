//! Product category service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{Category, CategoryWithCount};

use crate::error::{AppError, AppResult};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Input for creating or renaming a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a category
    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
                message_id: "Nama kategori wajib diisi".to_string(),
            });
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;
        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, (image IS NOT NULL) AS has_image, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// All categories with their product counts
    pub async fn list(&self) -> AppResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, (c.image IS NOT NULL) AS has_image,
                   COUNT(p.id) AS product_count, c.created_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name, c.image, c.created_at
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Rename a category
    pub async fn update(&self, category_id: Uuid, input: CategoryInput) -> AppResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
                message_id: "Nama kategori wajib diisi".to_string(),
            });
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $2
            WHERE id = $1
            RETURNING id, name, (image IS NOT NULL) AS has_image, created_at
            "#,
        )
        .bind(category_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(category)
    }

    /// Store or replace a category image
    pub async fn set_image(&self, category_id: Uuid, bytes: Vec<u8>) -> AppResult<()> {
        let updated = sqlx::query("UPDATE categories SET image = $1 WHERE id = $2")
            .bind(&bytes)
            .bind(category_id)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }

    /// Fetch a category's image bytes
    pub async fn get_image(&self, category_id: Uuid) -> AppResult<Vec<u8>> {
        let image: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT image FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        image.ok_or_else(|| AppError::NotFound("Category image".to_string()))
    }

    /// Export all categories with their product counts as CSV
    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let categories = self.list().await?;
        write_categories_csv(&categories)
    }

    /// Delete a category; its products are detached, not deleted
    pub async fn delete(&self, category_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}

fn write_categories_csv(categories: &[CategoryWithCount]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["name", "product_count"])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for c in categories {
        writer
            .write_record([c.name.as_str(), &c.product_count.to_string()])
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn category_csv_has_header_and_counts() {
        let rows = vec![
            CategoryWithCount {
                id: Uuid::new_v4(),
                name: "Minuman".to_string(),
                has_image: false,
                product_count: 3,
                created_at: Utc::now(),
            },
            CategoryWithCount {
                id: Uuid::new_v4(),
                name: "Snack".to_string(),
                has_image: true,
                product_count: 0,
                created_at: Utc::now(),
            },
        ];

        let text = String::from_utf8(write_categories_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["name,product_count", "Minuman,3", "Snack,0"]);
    }
}
