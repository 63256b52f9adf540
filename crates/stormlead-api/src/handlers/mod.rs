pub mod files;
pub mod health;
pub mod leads;
pub mod maintenance;
pub mod upload;
