//! Authentication service: registration with OTP verification, login,
//! password reset, and token issuance
//!
//! Self-registration lands in pending_users until the emailed 6-digit OTP is
//! confirmed; only then does the account move into users (always as a
//! customer). OTP codes are bcrypt-hashed at rest and expire after 10
//! minutes.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::User;
use shared::types::{Role, UserStatus};
use shared::validation::{validate_email, validate_otp_format, validate_password, validate_username};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::Mailer;
use crate::middleware::Claims;

const OTP_TTL_MINUTES: i64 = 10;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    mailer: Mailer,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for self-registration
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub password: String,
}

/// Input for OTP verification
#[derive(Debug, Deserialize)]
pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
}

/// Input for login; identifier is an email or username
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

/// Input for completing a password reset
#[derive(Debug, Deserialize)]
pub struct ResetPasswordInput {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// User row with credentials, backend-only
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    username: String,
    name: Option<String>,
    password_hash: String,
    role: Role,
    status: UserStatus,
    picture: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OtpRow {
    otp_hash: String,
    expires_at: DateTime<Utc>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            mailer: Mailer::new(&config.mail),
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Start self-registration: store the pending account and mail an OTP
    pub async fn register(&self, input: RegisterInput) -> AppResult<()> {
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

        let otp = generate_otp();
        let otp_hash = hash(&otp, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("OTP hashing failed: {}", e)))?;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let mut tx = self.db.begin().await?;

        // Re-registering before verification replaces the pending record.
        sqlx::query(
            r#"
            INSERT INTO pending_users (email, username, name, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET username = EXCLUDED.username,
                name = EXCLUDED.name,
                password_hash = EXCLUDED.password_hash,
                created_at = NOW()
            "#,
        )
        .bind(&input.email)
        .bind(&input.username)
        .bind(&input.name)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        self.store_otp(&mut tx, &input.email, "REGISTER", &otp_hash, expires_at)
            .await?;

        tx.commit().await?;

        self.mailer.send_otp(&input.email, &otp).await?;
        tracing::info!(email = %input.email, "registration OTP sent");
        Ok(())
    }

    /// Confirm the registration OTP and activate the account
    pub async fn verify_registration(&self, input: VerifyOtpInput) -> AppResult<AuthTokens> {
        self.check_otp(&input.email, "REGISTER", &input.otp).await?;

        let mut tx = self.db.begin().await?;

        let pending = sqlx::query_as::<_, (String, Option<String>, String)>(
            "SELECT username, name, password_hash FROM pending_users WHERE email = $1",
        )
        .bind(&input.email)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Pending registration".to_string()))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, name, password_hash, role, status)
            VALUES ($1, $2, $3, $4, 'PELANGGAN', 'AKTIF')
            RETURNING id, email, username, name, role, status, picture,
                      last_login_at, created_at
            "#,
        )
        .bind(&input.email)
        .bind(&pending.0)
        .bind(&pending.1)
        .bind(&pending.2)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pending_users WHERE email = $1")
            .bind(&input.email)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM otps WHERE email = $1 AND purpose = 'REGISTER'")
            .bind(&input.email)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.issue_tokens(user)
    }

    /// Authenticate with email or username
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, email, username, name, password_hash, role, status, picture,
                   last_login_at, created_at
            FROM users
            WHERE email = $1 OR username = $1
            "#,
        )
        .bind(&input.identifier)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if row.status != UserStatus::Aktif {
            return Err(AppError::Unauthorized {
                message: "Account is deactivated".to_string(),
                message_id: "Akun Anda sudah tidak aktif".to_string(),
            });
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(row.id)
            .execute(&self.db)
            .await?;

        let user = User {
            id: row.id,
            email: row.email,
            username: row.username,
            name: row.name,
            role: row.role,
            status: row.status,
            picture: row.picture,
            last_login_at: Some(Utc::now()),
            created_at: row.created_at,
        };

        self.issue_tokens(user)
    }

    /// Start a password reset: mail an OTP if the account exists
    ///
    /// Always returns Ok so callers cannot probe which emails are registered.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            tracing::debug!(%email, "password reset requested for unknown email");
            return Ok(());
        }

        let otp = generate_otp();
        let otp_hash = hash(&otp, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("OTP hashing failed: {}", e)))?;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let mut tx = self.db.begin().await?;
        self.store_otp(&mut tx, email, "RESET", &otp_hash, expires_at)
            .await?;
        tx.commit().await?;

        self.mailer.send_otp(email, &otp).await?;
        Ok(())
    }

    /// Complete a password reset with the mailed OTP
    pub async fn reset_password(&self, input: ResetPasswordInput) -> AppResult<()> {
        validate_password(&input.new_password).map_err(|e| AppError::Validation {
            field: "new_password".to_string(),
            message: e.to_string(),
            message_id: "Password minimal 8 karakter".to_string(),
        })?;

        self.check_otp(&input.email, "RESET", &input.otp).await?;

        let password_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
            .bind(&password_hash)
            .bind(&input.email)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        sqlx::query("DELETE FROM otps WHERE email = $1 AND purpose = 'RESET'")
            .bind(&input.email)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
        })
    }

    async fn store_otp(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        email: &str,
        purpose: &str,
        otp_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO otps (email, purpose, otp_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email, purpose) DO UPDATE
            SET otp_hash = EXCLUDED.otp_hash, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(email)
        .bind(purpose)
        .bind(otp_hash)
        .bind(expires_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn check_otp(&self, email: &str, purpose: &str, otp: &str) -> AppResult<()> {
        validate_otp_format(otp).map_err(|_| AppError::InvalidOtp)?;

        let row = sqlx::query_as::<_, OtpRow>(
            "SELECT otp_hash, expires_at FROM otps WHERE email = $1 AND purpose = $2",
        )
        .bind(email)
        .bind(purpose)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidOtp)?;

        if row.expires_at < Utc::now() {
            return Err(AppError::OtpExpired);
        }

        let valid = verify(otp, &row.otp_hash)
            .map_err(|e| AppError::Internal(format!("OTP verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidOtp);
        }
        Ok(())
    }
}

/// Generate a 6-digit numeric OTP
fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
