//! Multipart upload integration tests.
//!
//! Run with: `cargo test -p stormlead-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, setup_test_app_with, TestApp};
use serde_json::{json, Value};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn uploads(app: &TestApp) -> Vec<String> {
    match std::fs::read_dir(&app.state.paths.uploads) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn file_part(bytes: &[u8], name: &str, mime: &str) -> Part {
    Part::bytes(bytes.to_vec()).file_name(name).mime_type(mime)
}

#[tokio::test]
async fn test_upload_image_is_stored_in_uploads() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_part("file", file_part(PNG_SIGNATURE, "roof damage.png", "image/png"));

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    let file = &body["files"][0];
    assert_eq!(file["originalName"], json!("roof damage.png"));
    assert_eq!(file["mimeType"], json!("image/png"));
    assert_eq!(file["kind"], json!("image"));
    assert_eq!(file["size"], json!(PNG_SIGNATURE.len()));

    let stored_name = file["fileName"].as_str().unwrap();
    assert!(stored_name.ends_with("-roof_damage.png"));
    assert_eq!(uploads(&app), vec![stored_name.to_string()]);
    assert_eq!(
        std::fs::read(app.state.paths.uploads.join(stored_name)).unwrap(),
        PNG_SIGNATURE
    );
    assert!(!app.state.paths.temp.join(stored_name).exists());
}

#[tokio::test]
async fn test_upload_accepts_documents_and_skips_text_fields() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("leadName", "Jane Doe")
        .add_part("file", file_part(b"%PDF-1.4", "estimate.pdf", "application/pdf"))
        .add_part("file", file_part(b"notes", "notes.txt", "text/plain; charset=utf-8"));

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["kind"], json!("document"));
    assert_eq!(files[1]["mimeType"], json!("text/plain"));
    assert_eq!(uploads(&app).len(), 2);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_part(
        "file",
        file_part(b"MZ", "setup.exe", "application/x-msdownload"),
    );

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("INVALID_INPUT"));
    assert!(body["error"].as_str().unwrap().contains("image/jpeg"));
    assert!(uploads(&app).is_empty());
}

#[tokio::test]
async fn test_upload_rejects_too_many_files() {
    let app = setup_test_app_with(|config| config.upload.max_files = 2).await;
    let mut form = MultipartForm::new();
    for i in 0..3 {
        form = form.add_part("file", file_part(PNG_SIGNATURE, &format!("photo-{i}.png"), "image/png"));
    }

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    assert!(uploads(&app).is_empty());
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = setup_test_app_with(|config| {
        config.upload.max_file_size = 16;
        config.upload.max_files = 100;
    })
    .await;
    let form = MultipartForm::new().add_part("file", file_part(&[0u8; 32], "big.png", "image/png"));

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(uploads(&app).is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_text("leadName", "Jane Doe");

    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], json!("No file provided"));
}
