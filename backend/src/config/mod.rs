//! Central module for application-wide configuration settings.
//!
//! This module loads the database URL, JWT signing secret, password hashing
//! cost and SMTP transport credentials from the environment.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Absent secrets are tolerated at startup; token issuance fails instead.
    pub jwt_secret: Option<String>,
    pub server_port: u16,
    pub production: bool,
    pub bcrypt_cost: u32,
    pub email: Option<EmailConfig>,
    pub email_timeout_seconds: u64,
}

/// SMTP transport settings for outgoing verification emails.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = non_empty_var("JWT_SECRET");

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let production = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;

        let email_timeout_seconds = env::var("EMAIL_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("EMAIL_TIMEOUT_SECONDS must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            server_port,
            production,
            bcrypt_cost,
            email: EmailConfig::from_env()?,
            email_timeout_seconds,
        })
    }
}

impl EmailConfig {
    /// Returns `None` when SMTP credentials are not configured.
    fn from_env() -> Result<Option<Self>> {
        let (Some(smtp_username), Some(smtp_password)) =
            (non_empty_var("SMTP_USERNAME"), non_empty_var("SMTP_PASSWORD"))
        else {
            return Ok(None);
        };

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "465".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        let from_email = non_empty_var("EMAIL_FROM").unwrap_or_else(|| smtp_username.clone());
        let from_name = env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Relocator".to_string());

        Ok(Some(EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
        }))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
impl Config {
    /// In-memory configuration for tests.
    pub fn for_tests(jwt_secret: Option<&str>) -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: jwt_secret.map(str::to_string),
            server_port: 0,
            production: false,
            bcrypt_cost: 4,
            email: None,
            email_timeout_seconds: 1,
        }
    }
}
