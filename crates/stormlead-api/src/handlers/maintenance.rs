use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use stormlead_core::{AppError, StorageStats};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct BackupResponse {
    pub success: bool,
    #[serde(rename = "backupPath", skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Create a backup of the lead file
#[utoipa::path(
    post,
    path = "/api/backup",
    tag = "maintenance",
    responses(
        (status = 200, description = "Backup written to the backups directory", body = BackupResponse),
        (status = 500, description = "No backup could be created", body = BackupResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "create_backup"))]
pub async fn create_backup(State(state): State<Arc<AppState>>) -> Response {
    match state.maintenance.backup_leads().await {
        Some(path) => Json(BackupResponse {
            success: true,
            backup_path: Some(path.display().to_string()),
            message: None,
        })
        .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BackupResponse {
                success: false,
                backup_path: None,
                message: Some("Backup failed".to_string()),
            }),
        )
            .into_response(),
    }
}

/// Disk usage of the managed directories
#[utoipa::path(
    get,
    path = "/api/storage",
    tag = "maintenance",
    responses(
        (status = 200, description = "Byte counts per directory", body = StorageStats),
        (status = 500, description = "Usage could not be computed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "storage_stats"))]
pub async fn storage_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StorageStats>, HttpAppError> {
    state
        .maintenance
        .get_storage_stats()
        .await
        .map(Json)
        .ok_or_else(|| AppError::Storage("storage statistics unavailable".to_string()).into())
}
