//! Storage accounting models: per-category byte counts and directory listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bytes used by each managed directory, computed recursively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StorageStats {
    pub uploads: u64,
    pub images: u64,
    pub backups: u64,
    pub logs: u64,
    pub total: u64,
}

impl StorageStats {
    /// Build stats from the four category sizes; `total` is always their sum.
    pub fn new(uploads: u64, images: u64, backups: u64, logs: u64) -> Self {
        Self {
            uploads,
            images,
            backups,
            logs,
            total: uploads + images + backups + logs,
        }
    }

    pub fn total_megabytes(&self) -> f64 {
        self.total as f64 / 1024.0 / 1024.0
    }
}

/// A single file found directly inside a managed directory
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}
