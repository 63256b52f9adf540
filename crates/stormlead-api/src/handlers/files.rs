use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use stormlead_core::config::{ImageConfig, UploadConfig};
use stormlead_core::{AppError, FileEntry, StoragePaths};
use utoipa::{IntoParams, ToSchema};

/// Settings the front end needs to validate uploads before sending them
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientConfigResponse {
    #[schema(value_type = Object)]
    pub upload: UploadConfig,
    #[schema(value_type = Object)]
    pub images: ImageConfig,
}

/// Get public client configuration
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "files",
    responses(
        (status = 200, description = "Upload limits and image settings", body = ClientConfigResponse)
    )
)]
pub async fn get_client_config(State(state): State<Arc<AppState>>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        upload: state.config.upload.clone(),
        images: state.config.images.clone(),
    })
}

/// Managed directory a listing can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Images,
    Uploads,
    Backups,
}

impl FileCategory {
    fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") | Some("images") => Ok(FileCategory::Images),
            Some("uploads") => Ok(FileCategory::Uploads),
            Some("backups") => Ok(FileCategory::Backups),
            Some(other) => Err(AppError::BadRequest(format!(
                "Unknown file type '{}': expected images, uploads or backups",
                other
            ))),
        }
    }

    fn directory(self, paths: &StoragePaths) -> PathBuf {
        match self {
            FileCategory::Images => paths.images.clone(),
            FileCategory::Uploads => paths.uploads.clone(),
            FileCategory::Backups => paths.backups.clone(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FileListQuery {
    /// Directory to list: images (default), uploads or backups
    #[serde(rename = "type")]
    pub category: Option<String>,
}

/// List files in a managed directory
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Files directly inside the directory", body = Vec<FileEntry>),
        (status = 400, description = "Unknown directory type", body = ErrorResponse),
        (status = 500, description = "Directory could not be read", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<Vec<FileEntry>>, HttpAppError> {
    let dir = FileCategory::parse(query.category.as_deref())?.directory(&state.paths);

    let files = stormlead_storage::list_files(&dir).await.map_err(|e| {
        tracing::error!(error = %e, path = %dir.display(), "Error listing files");
        AppError::from(e)
    })?;

    Ok(Json(files))
}
