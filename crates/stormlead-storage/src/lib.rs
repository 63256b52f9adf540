//! Stormlead Storage Library
//!
//! This crate owns everything that touches the lead backing file and the managed
//! directories on disk. It provides the `LeadStore` trait with its JSON file
//! implementation, plus directory helpers used by the maintenance service and the API.
//!
//! # Backing file format
//!
//! The lead file is a single pretty-printed JSON array (two-space indent), ordered by
//! submission. A missing file reads as an empty array; a file that does not parse is
//! reported as [`StorageError::Corrupt`] and never rewritten.

pub mod json_file;
pub mod paths;
pub mod traits;

// Re-export commonly used types
pub use json_file::JsonFileLeadStore;
pub use paths::{directory_size, ensure_directories, files_modified_before, list_files};
pub use traits::{LeadStore, StorageError, StorageResult};
