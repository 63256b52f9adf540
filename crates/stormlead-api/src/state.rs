//! Application state shared by every handler.

use std::sync::Arc;

use stormlead_core::{Config, StoragePaths};
use stormlead_services::{FileMaintenanceService, LeadStore};

pub struct AppState {
    pub config: Config,
    pub paths: StoragePaths,
    pub lead_store: Arc<dyn LeadStore>,
    pub maintenance: Arc<FileMaintenanceService>,
}

impl AppState {
    pub fn new(
        config: Config,
        lead_store: Arc<dyn LeadStore>,
        maintenance: Arc<FileMaintenanceService>,
    ) -> Self {
        let paths = maintenance.paths().clone();
        Self {
            config,
            paths,
            lead_store,
            maintenance,
        }
    }
}
