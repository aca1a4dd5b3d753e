//! Application state shared across handlers.

use crate::config::Config;
use crate::services::email_service::Mailer;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Owned handles every request needs: the pool, configuration and mailer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mailer,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        Arc::clone(&self.inner.mailer)
    }
}
