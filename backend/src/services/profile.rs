//! Profile service: the authenticated user's own account

use bcrypt::{hash, verify, DEFAULT_COST};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::User;
use shared::validation::{validate_password, validate_username};

use crate::error::{AppError, AppResult};

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Input for updating the caller's own profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub username: Option<String>,
    pub picture: Option<String>,
}

/// Input for changing the caller's own password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// The caller's own account
    pub async fn me(&self, user_id: Uuid) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, name, role, status, picture,
                   last_login_at, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user)
    }

    /// Update the caller's own profile
    pub async fn update(&self, user_id: Uuid, input: UpdateProfileInput) -> AppResult<User> {
        if let Some(username) = &input.username {
            validate_username(username).map_err(|e| AppError::Validation {
                field: "username".to_string(),
                message: e.to_string(),
                message_id: "Format username tidak valid".to_string(),
            })?;

            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
            )
            .bind(username)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::DuplicateEntry("username".to_string()));
            }
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                username = COALESCE($3, username),
                picture = COALESCE($4, picture)
            WHERE id = $1
            RETURNING id, email, username, name, role, status, picture,
                      last_login_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.username)
        .bind(&input.picture)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user)
    }

    /// Change the caller's password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        validate_password(&input.new_password).map_err(|e| AppError::Validation {
            field: "new_password".to_string(),
            message: e.to_string(),
            message_id: "Password minimal 8 karakter".to_string(),
        })?;

        let current_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
