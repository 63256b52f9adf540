//! Stormlead Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Stormlead component: the lead API, the maintenance service and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    BackupConfig, Config, EmailConfig, ImageConfig, LoggingConfig, NotificationConfig,
    SecurityConfig, ServerConfig, StorageConfig, StoragePaths, UploadConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FileEntry, Lead, StorageStats, LEAD_ID_FIELD};
