//! Checks shared by the upload handler

use serde::Serialize;
use stormlead_core::{AppError, Config};
use utoipa::ToSchema;

const MAX_FILENAME_LENGTH: usize = 255;

/// Which allow-list an uploaded file matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Match a normalized MIME type against the configured image and document lists.
pub fn classify_content_type(content_type: &str, config: &Config) -> Result<FileKind, AppError> {
    if config.is_image_type(content_type) {
        Ok(FileKind::Image)
    } else if config.is_document_type(content_type) {
        Ok(FileKind::Document)
    } else {
        Err(AppError::InvalidInput(format!(
            "Invalid content type '{}'. Allowed types: {}",
            content_type,
            config.allowed_types().join(", ")
        )))
    }
}

/// Sanitize filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let filename_only = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormlead_core::ErrorMetadata;

    #[test]
    fn mime_parameters_are_dropped() {
        assert_eq!(normalize_mime_type("Image/PNG; charset=binary"), "image/png");
        assert_eq!(normalize_mime_type("application/pdf"), "application/pdf");
    }

    #[test]
    fn content_types_are_classified() {
        let config = Config::default();
        assert_eq!(
            classify_content_type("image/webp", &config).unwrap(),
            FileKind::Image
        );
        assert_eq!(
            classify_content_type("application/pdf", &config).unwrap(),
            FileKind::Document
        );

        let err = classify_content_type("application/x-msdownload", &config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.client_message().contains("image/jpeg"));
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("roof photo (1).jpg").unwrap(), "roof_photo__1_.jpg");
        assert_eq!(sanitize_filename("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("a").unwrap(), "file");
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate_file_size(1024, 1024).is_ok());
        let err = validate_file_size(1025, 1024).unwrap_err();
        assert_eq!(err.http_status_code(), 413);
    }
}
