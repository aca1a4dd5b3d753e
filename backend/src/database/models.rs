//! Rust structs that represent database table mappings.
//!
//! These models define the user record as it is stored in and retrieved from
//! the `users` table. Request/response shapes live in `auth::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Access role of a user account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_verified: bool,
    /// Pending sign-up verification code; cleared once consumed.
    /// Only compared inside SQL outside of tests.
    #[allow(dead_code)]
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    /// Pending password reset code; cleared once a new password is applied.
    #[serde(skip_serializing)]
    pub reset_code: Option<String>,
    pub marketing_consent: bool,
    pub terms_and_conditions: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name used to greet the user in emails.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for a new user. Only the password hash crosses this boundary.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub verification_code: String,
    pub marketing_consent: bool,
    pub terms_and_conditions: bool,
}
