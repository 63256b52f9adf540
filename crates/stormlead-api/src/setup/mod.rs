//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded `Config` to a router, kept out of
//! `main.rs` so the integration tests can build the same application.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use stormlead_core::Config;

/// Initialize telemetry, then the whole application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    build_app(config).await
}

/// Build state and routes without touching the global tracing subscriber.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
