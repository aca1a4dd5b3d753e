//! Database repository for user records.
//!
//! Every state transition of a user's credentials is a single conditional
//! `UPDATE ... RETURNING` statement, so concurrent requests can never observe
//! or apply a half-finished transition.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, is_verified, \
     verification_code, reset_code, marketing_consent, terms_and_conditions, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new, unverified user.
    ///
    /// # Returns
    /// `Some(User)` with all fields populated, or `None` if the email is
    /// already taken. Uniqueness is enforced by the table constraint.
    pub async fn create_user(&self, user: CreateUser) -> Result<Option<User>> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, role, is_verified,
                verification_code, marketing_consent, terms_and_conditions, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.role)
            .bind(user.verification_code)
            .bind(user.marketing_consent)
            .bind(user.terms_and_conditions)
            .bind(now)
            .bind(now)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    #[cfg(test)]
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their email, compared exactly as stored.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Replaces the pending sign-up code of an unverified user.
    ///
    /// # Returns
    /// `None` if the user does not exist or is already verified.
    pub async fn replace_verification_code(&self, email: &str, code: &str) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET verification_code = ?, updated_at = ?
            WHERE email = ? AND is_verified = 0
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(code)
            .bind(Utc::now())
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Marks the user verified and clears the code, only if `code` matches.
    ///
    /// # Returns
    /// `None` if the user does not exist or the stored code differs.
    pub async fn consume_verification_code(&self, email: &str, code: &str) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET is_verified = 1, verification_code = NULL, updated_at = ?
            WHERE email = ? AND verification_code IS NOT NULL AND verification_code = ?
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(Utc::now())
            .bind(email)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Replaces the pending password reset code, regardless of verification state.
    ///
    /// # Returns
    /// `None` if the user does not exist.
    pub async fn replace_reset_code(&self, email: &str, code: &str) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET reset_code = ?, updated_at = ?
            WHERE email = ?
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(code)
            .bind(Utc::now())
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Replaces the password hash and clears the reset code, only if `code` matches.
    ///
    /// # Returns
    /// `None` if the user does not exist or the stored reset code differs.
    pub async fn apply_password_reset(
        &self,
        email: &str,
        code: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET password_hash = ?, reset_code = NULL, updated_at = ?
            WHERE email = ? AND reset_code IS NOT NULL AND reset_code = ?
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(password_hash)
            .bind(Utc::now())
            .bind(email)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }
}
