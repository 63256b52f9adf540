//! Stormlead Services Layer
//!
//! This crate is the business service layer: it hosts the file maintenance service
//! (backups, retention sweeps, image organization and optimization, storage stats)
//! and re-exports the storage and processing types the API and CLI need, so both
//! depend on a single service facade.

pub mod maintenance;

pub use maintenance::{
    FileMaintenanceService, MaintenanceLog, MaintenanceReport, MaintenanceSettings,
};
pub use stormlead_processing::{Bounds, ImageOptimizer, OutputFormat, RasterOptimizer};
pub use stormlead_storage::{JsonFileLeadStore, LeadStore, StorageError, StorageResult};
