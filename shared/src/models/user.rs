//! User models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{Role, UserStatus};

/// A user account (admin, cashier, or customer)
///
/// The password hash is intentionally not part of this model; it stays in
/// backend-only row types.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub picture: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
