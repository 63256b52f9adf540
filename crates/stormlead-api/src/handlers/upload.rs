use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    classify_content_type, normalize_mime_type, sanitize_filename, validate_file_size, FileKind,
};
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use stormlead_core::{AppError, StoragePaths};
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFile {
    #[serde(rename = "originalName")]
    pub original_name: String,
    /// Name under the uploads directory
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub size: usize,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub kind: FileKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}

struct PendingFile {
    meta: UploadedFile,
    data: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Upload photos or documents
///
/// Every file part of the form is checked before anything is written, so a rejected
/// request leaves the uploads directory unchanged.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files stored in the uploads directory", body = UploadResponse),
        (status = 400, description = "No file, too many files or a disallowed type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "File could not be stored", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_files"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut multipart = multipart
        .map_err(|r| AppError::InvalidInput(format!("Invalid upload: {}", r.body_text())))?;
    let limits = &state.config.upload;

    let mut pending = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        // Plain form fields carry no file name
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        if pending.len() >= limits.max_files {
            return Err(AppError::BadRequest(format!(
                "Too many files. At most {} files per upload",
                limits.max_files
            ))
            .into());
        }

        let mime_type = normalize_mime_type(field.content_type().unwrap_or("application/octet-stream"));
        let kind = classify_content_type(&mime_type, &state.config)?;
        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&original_name)?);

        let data = field.bytes().await.map_err(multipart_error)?;
        validate_file_size(data.len(), limits.max_file_size)?;

        pending.push(PendingFile {
            meta: UploadedFile {
                original_name,
                file_name,
                size: data.len(),
                mime_type,
                kind,
            },
            data,
        });
    }

    if pending.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()).into());
    }

    let mut files = Vec::with_capacity(pending.len());
    for file in pending {
        store_file(&state.paths, &file.meta.file_name, &file.data)
            .await
            .map_err(AppError::from)?;
        tracing::info!(
            file_name = %file.meta.file_name,
            mime_type = %file.meta.mime_type,
            size_bytes = file.meta.size,
            "File uploaded"
        );
        files.push(file.meta);
    }

    Ok(Json(UploadResponse {
        success: true,
        files,
    }))
}

/// Write into the temp directory, then move into uploads.
async fn store_file(paths: &StoragePaths, file_name: &str, data: &[u8]) -> anyhow::Result<()> {
    let staged = paths.temp.join(file_name);
    let destination = paths.uploads.join(file_name);

    fs::create_dir_all(&paths.temp)
        .await
        .with_context(|| format!("Failed to create {}", paths.temp.display()))?;
    fs::create_dir_all(&paths.uploads)
        .await
        .with_context(|| format!("Failed to create {}", paths.uploads.display()))?;
    fs::write(&staged, data)
        .await
        .with_context(|| format!("Failed to write {}", staged.display()))?;

    move_file(&staged, &destination)
        .await
        .with_context(|| format!("Failed to move upload into {}", destination.display()))
}

async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    // temp and uploads may sit on different filesystems
    let copied = fs::copy(from, to).await;
    let _ = fs::remove_file(from).await;
    copied.map(|_| ())
}
