//! Store and maintenance service wiring

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use stormlead_core::Config;
use stormlead_services::{
    FileMaintenanceService, JsonFileLeadStore, LeadStore, MaintenanceSettings, RasterOptimizer,
};

/// Open the lead store, prepare the managed directories and start the optional
/// backup loop.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let paths = config.storage_paths();

    let lead_store: Arc<dyn LeadStore> = Arc::new(JsonFileLeadStore::new(&paths.leads_file));
    lead_store
        .initialize()
        .await
        .with_context(|| format!("Failed to initialize lead file {}", paths.leads_file.display()))?;
    tracing::info!(path = %paths.leads_file.display(), "Lead store ready");

    let settings = MaintenanceSettings::from_config(config)?;
    let maintenance = Arc::new(FileMaintenanceService::new(
        settings,
        paths,
        lead_store.clone(),
        Arc::new(RasterOptimizer::new()),
    ));

    if !maintenance.ensure_directories().await {
        tracing::warn!("Some storage directories could not be created");
    }

    if config.backup.auto_backup {
        let period = config
            .backup_interval()
            .context("BACKUP_INTERVAL_HOURS is too large")?;
        // Detached; the loop ends with the runtime
        let _handle = maintenance.clone().start_auto_backup(period);
        tracing::info!(
            interval_hours = config.backup.backup_interval_hours,
            "Automatic lead backups enabled"
        );
    }

    Ok(Arc::new(AppState::new(
        config.clone(),
        lead_store,
        maintenance,
    )))
}
