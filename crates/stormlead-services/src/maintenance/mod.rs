//! File maintenance
//!
//! Housekeeping over the on-disk layout: lead backups and their retention, log
//! retention, moving uploaded images into the images directory, producing optimized
//! variants, and reporting how much space each area uses.

mod log;
mod service;

use std::path::PathBuf;

use serde::Serialize;
use stormlead_core::{Config, StorageStats};
use stormlead_processing::{Bounds, OutputFormat};

pub use log::MaintenanceLog;
pub use service::FileMaintenanceService;

/// Extensions treated as images by organize and optimize, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Knobs the maintenance service needs, extracted from [`Config`].
#[derive(Debug, Clone)]
pub struct MaintenanceSettings {
    pub max_backup_age_days: u32,
    pub max_log_age_days: u32,
    pub image_bounds: Bounds,
    pub image_quality: u8,
    pub image_format: OutputFormat,
    pub log_to_file: bool,
}

impl MaintenanceSettings {
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let image_format = OutputFormat::parse(&config.images.default_format)
            .map_err(|e| anyhow::anyhow!("Invalid IMAGE_FORMAT: {}", e))?;

        Ok(Self {
            max_backup_age_days: config.backup.max_backup_age_days,
            max_log_age_days: config.logging.max_log_age_days,
            image_bounds: Bounds::new(config.images.max_width, config.images.max_height),
            image_quality: config.images.quality,
            image_format,
            log_to_file: config.logging.log_to_file,
        })
    }
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            max_backup_age_days: 30,
            max_log_age_days: 7,
            image_bounds: Bounds::new(1920, 1080),
            image_quality: 85,
            image_format: OutputFormat::WebP,
            log_to_file: true,
        }
    }
}

/// Outcome of each step of a maintenance run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub directories_ready: bool,
    pub backup_path: Option<PathBuf>,
    pub backups_removed: usize,
    pub logs_removed: usize,
    pub images_organized: usize,
    pub images_optimized: usize,
    pub storage: Option<StorageStats>,
}

pub(crate) fn has_image_extension(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
