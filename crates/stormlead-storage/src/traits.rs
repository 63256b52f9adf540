//! Lead store abstraction
//!
//! This module defines the LeadStore trait that every lead backend must implement.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use stormlead_core::{AppError, Lead};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Lead file is corrupt ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Lead persistence abstraction
///
/// The store is append-only: leads are never updated or deleted through it.
/// Implementations serialize their own read-modify-write cycles so a single
/// instance can be shared across request handlers behind an `Arc`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Create an empty store if none exists yet. Existing data is left untouched.
    async fn initialize(&self) -> StorageResult<()>;

    /// Append a lead built from `payload`, assigning `id` and `submittedAt`.
    ///
    /// Returns the record exactly as stored.
    async fn append(&self, payload: Map<String, Value>) -> StorageResult<Lead>;

    /// All stored records in submission order, exactly as they appear in the store.
    ///
    /// Records added by other tools need not carry `id` or `submittedAt`.
    async fn list_all(&self) -> StorageResult<Vec<Value>>;

    /// Number of stored leads.
    async fn count(&self) -> StorageResult<usize> {
        Ok(self.list_all().await?.len())
    }

    /// Copy the backing data into `destination_dir` under a timestamped name.
    ///
    /// Fails with [`StorageError::NotFound`] when there is nothing to back up.
    async fn backup(&self, destination_dir: &Path) -> StorageResult<PathBuf>;

    /// Where the backing data lives, for logging.
    fn location(&self) -> &Path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormlead_core::ErrorMetadata;

    #[test]
    fn storage_errors_map_to_app_errors() {
        let missing: AppError = StorageError::NotFound("leads.json".to_string()).into();
        assert_eq!(missing.error_code(), "NOT_FOUND");

        let io: AppError =
            StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom")).into();
        assert_eq!(io.error_code(), "STORAGE_ERROR");
        assert_eq!(io.client_message(), "Failed to access lead storage");
    }
}
