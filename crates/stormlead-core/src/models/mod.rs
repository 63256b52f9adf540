//! Data models for the application
//!
//! Leads are the only business record; the remaining types describe what the
//! maintenance tooling observes on disk.

mod lead;
mod storage;

pub use lead::*;
pub use storage::*;
