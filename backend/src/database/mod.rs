//! Module for database connection setup.
//!
//! The pool is created once at startup, owned by `AppState`, and handed to
//! handlers via an axum `Extension`. Connections open lazily on first use.

use crate::config::Config;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

pub mod models;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Builds the connection pool without opening a connection yet.
    pub fn new(config: &Config) -> Result<Self> {
        let database_url = &config.database_url;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid DATABASE_URL: {database_url}"))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds));

        // An in-memory database lives only as long as its connection.
        if database_url.contains(":memory:") {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_lazy_with(connect_options);

        Ok(Database { pool })
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let database = Database::new(&Config::for_tests(None)).expect("test database options");
    database.migrate().await.expect("test migrations");
    database.pool
}
