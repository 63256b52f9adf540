//! Shared plumbing for the maintenance command-line tool.

use std::sync::Arc;

use anyhow::Context;
use stormlead_core::Config;
use stormlead_services::{
    FileMaintenanceService, JsonFileLeadStore, LeadStore, MaintenanceSettings, RasterOptimizer,
};

/// Build the maintenance service the same way the server does, from `config`.
pub fn build_service(config: &Config) -> anyhow::Result<FileMaintenanceService> {
    let settings = MaintenanceSettings::from_config(config).context("Invalid maintenance settings")?;
    let paths = config.storage_paths();
    let lead_store: Arc<dyn LeadStore> = Arc::new(JsonFileLeadStore::new(&paths.leads_file));

    Ok(FileMaintenanceService::new(
        settings,
        paths,
        lead_store,
        Arc::new(RasterOptimizer::new()),
    ))
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}
