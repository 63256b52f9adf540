//! OpenAPI documentation for the JSON endpoints.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use stormlead_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stormlead API",
        version = "0.1.0",
        description = "Lead intake for the roofing landing page plus file maintenance endpoints for the admin page."
    ),
    paths(
        // Leads
        handlers::leads::submit_lead,
        handlers::leads::list_leads,
        // Files
        handlers::files::get_client_config,
        handlers::files::list_files,
        handlers::upload::upload_files,
        // Maintenance
        handlers::maintenance::create_backup,
        handlers::maintenance::storage_stats,
        // Health
        handlers::health::health_check,
    ),
    components(schemas(
        models::Lead,
        models::FileEntry,
        models::StorageStats,
        handlers::leads::SubmitLeadResponse,
        handlers::files::ClientConfigResponse,
        handlers::upload::UploadResponse,
        handlers::upload::UploadedFile,
        crate::utils::upload::FileKind,
        handlers::maintenance::BackupResponse,
        handlers::health::HealthCheckResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "leads", description = "Lead submission and listing"),
        (name = "files", description = "Client settings, uploads and managed file listings"),
        (name = "maintenance", description = "Backups and storage usage"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_json_route() {
        let spec = get_openapi_spec();
        for path in [
            "/api/leads",
            "/api/config",
            "/api/files",
            "/api/upload",
            "/api/backup",
            "/api/storage",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
