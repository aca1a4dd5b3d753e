//! Main entry point for the Relocator auth backend.
//!
//! This file initializes logging, loads configuration, prepares the database
//! pool and schema, and serves the Axum application until shutdown.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod state;
mod utils;

use anyhow::Context;
use config::Config;
use database::Database;
use services::email_service::mailer_from_config;
use state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.jwt_secret.is_none() {
        warn!("JWT_SECRET not set, token-issuing endpoints will fail");
    }

    let db = Database::new(&config)?;
    db.migrate().await?;

    let mailer = mailer_from_config(config.email.clone())?;
    let server_port = config.server_port;
    let state = AppState::new(config, db.pool().clone(), mailer);

    let app = api::app_router(state);

    let bind_address = format!("0.0.0.0:{server_port}");
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    info!("Starting Relocator auth server on port {}", server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
