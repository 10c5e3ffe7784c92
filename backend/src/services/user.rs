//! User administration service

use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::User;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, Role, UserStatus};
use shared::validation::{validate_email, validate_password, validate_username};

use crate::error::{AppError, AppResult};

const USER_COLUMNS: &str =
    "id, email, username, name, role, status, picture, last_login_at, created_at";

/// User administration service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for creating a user (admin-created cashier or admin accounts)
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Input for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Listing filters for the admin user screen
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a user directly, bypassing OTP verification
    pub async fn create(&self, input: CreateUserInput) -> AppResult<User> {
        validate_email(&input.email).map_err(|e| AppError::Validation {
            field: "email".to_string(),
            message: e.to_string(),
            message_id: "Format email tidak valid".to_string(),
        })?;
        validate_username(&input.username).map_err(|e| AppError::Validation {
            field: "username".to_string(),
            message: e.to_string(),
            message_id: "Format username tidak valid".to_string(),
        })?;
        validate_password(&input.password).map_err(|e| AppError::Validation {
            field: "password".to_string(),
            message: e.to_string(),
            message_id: "Password minimal 8 karakter".to_string(),
        })?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(&input.email)
        .bind(&input.username)
        .fetch_one(&self.db)
        .await?;
        if taken {
            return Err(AppError::DuplicateEntry("email/username".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, name, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, 'AKTIF')
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.username)
        .bind(&input.name)
        .bind(&password_hash)
        .bind(input.role)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// Paginated user listing with optional search and role filter
    pub async fn list(
        &self,
        filter: &UserFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<User>> {
        let search = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let offset = (pagination.page.saturating_sub(1) as i64) * pagination.per_page as i64;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR email ILIKE $1 OR username ILIKE $1 OR name ILIKE $1)
              AND ($2::user_role IS NULL OR role = $2)
            "#,
        )
        .bind(&search)
        .bind(filter.role)
        .fetch_one(&self.db)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::text IS NULL OR email ILIKE $1 OR username ILIKE $1 OR name ILIKE $1)
              AND ($2::user_role IS NULL OR role = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(filter.role)
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: users,
            pagination: PaginationMeta::new(pagination.page, pagination.per_page, total as u64),
        })
    }

    /// Get a single user
    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user)
    }

    /// Update a user's name, role, or status
    pub async fn update(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                status = COALESCE($4, status)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(input.role)
        .bind(input.status)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user)
    }

    /// Deactivate a user
    ///
    /// Accounts with order history are never deleted, only deactivated.
    pub async fn deactivate(&self, user_id: Uuid) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET status = 'TIDAK_AKTIF'
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user)
    }

    /// Export the full user list as CSV
    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["email", "username", "name", "role", "status"])
            .map_err(|e| AppError::Internal(e.to_string()))?;

        for u in &users {
            let status = match u.status {
                UserStatus::Aktif => "AKTIF",
                UserStatus::TidakAktif => "TIDAK_AKTIF",
            };
            writer
                .write_record([
                    u.email.as_str(),
                    u.username.as_str(),
                    u.name.as_deref().unwrap_or(""),
                    u.role.as_str(),
                    status,
                ])
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
