//! Static pages, health, maintenance and documentation endpoints.
//!
//! Run with: `cargo test -p stormlead-api --test app_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{setup_test_app, ADMIN_HTML, INDEX_HTML};
use serde_json::{json, Value};

#[tokio::test]
async fn test_landing_and_admin_pages() {
    let app = setup_test_app().await;
    let client = app.client();

    let index = client.get("/").await;
    index.assert_status_ok();
    assert_eq!(index.text(), INDEX_HTML);

    let admin = client.get("/admin").await;
    admin.assert_status_ok();
    assert_eq!(admin.text(), ADMIN_HTML);
}

#[tokio::test]
async fn test_static_files_served_from_public_root() {
    let app = setup_test_app().await;
    std::fs::write(app.root().join("public").join("styles.css"), "body{}").unwrap();

    let response = app.client().get("/styles.css").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "body{}");

    app.client()
        .get("/missing.js")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_lead_count() {
    let app = setup_test_app().await;
    let client = app.client();

    client
        .post("/api/leads")
        .json(&json!({"name": "Jane Doe"}))
        .await
        .assert_status_ok();

    let response = client.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "healthy", "leads": 1}));
}

#[tokio::test]
async fn test_health_unavailable_when_store_unreadable() {
    let app = setup_test_app().await;
    std::fs::write(app.leads_file(), "{").unwrap();

    app.client()
        .get("/health")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_backup_then_list_backups() {
    let app = setup_test_app().await;
    let client = app.client();

    client
        .post("/api/leads")
        .json(&json!({"name": "Jane Doe"}))
        .await
        .assert_status_ok();

    let response = client.post("/api/backup").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    let backup_path = body["backupPath"].as_str().expect("backupPath is a string");
    assert_eq!(
        std::fs::read(backup_path).unwrap(),
        std::fs::read(app.leads_file()).unwrap()
    );

    let files: Vec<Value> = client
        .get("/api/files")
        .add_query_param("type", "backups")
        .await
        .json();
    assert_eq!(files.len(), 1);
    let name = files[0]["name"].as_str().unwrap();
    assert!(name.starts_with("leads-backup-"));
    assert!(name.ends_with(".json"));
    assert!(files[0]["size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_backup_without_leads_file_fails() {
    let app = setup_test_app().await;
    std::fs::remove_file(app.leads_file()).unwrap();

    let response = app.client().post("/api/backup").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[tokio::test]
async fn test_files_default_to_images() {
    let app = setup_test_app().await;
    std::fs::write(app.state.paths.images.join("roof.jpg"), b"jpeg").unwrap();

    let files: Vec<Value> = app.client().get("/api/files").await.json();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], json!("roof.jpg"));
    assert_eq!(files[0]["size"], json!(4));
}

#[tokio::test]
async fn test_files_unknown_type_rejected() {
    let app = setup_test_app().await;

    app.client()
        .get("/api/files")
        .add_query_param("type", "secrets")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_stats() {
    let app = setup_test_app().await;
    std::fs::write(app.state.paths.uploads.join("a.png"), vec![0u8; 100]).unwrap();
    std::fs::write(app.state.paths.images.join("b.png"), vec![0u8; 50]).unwrap();

    let response = app.client().get("/api/storage").await;
    response.assert_status_ok();

    let stats: Value = response.json();
    assert_eq!(stats["uploads"], json!(100));
    assert_eq!(stats["images"], json!(50));
    assert_eq!(stats["total"], json!(150));
}

#[tokio::test]
async fn test_client_config() {
    let app = setup_test_app().await;

    let body: Value = app.client().get("/api/config").await.json();

    assert_eq!(body["upload"]["maxFileSize"], json!(10 * 1024 * 1024));
    assert_eq!(body["images"]["quality"], json!(85));
    assert!(body["upload"]["allowedImageTypes"]
        .as_array()
        .unwrap()
        .contains(&json!("image/jpeg")));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let spec: Value = app.client().get("/api/openapi.json").await.json();

    assert_eq!(spec["info"]["title"], json!("Stormlead API"));
    assert!(spec["paths"]["/api/leads"].is_object());
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let app = setup_test_app().await;
    let client = app.client();

    let generated = client.get("/health").await;
    assert!(!generated.header("x-request-id").is_empty());

    let echoed = client
        .get("/health")
        .add_header("X-Request-ID", "lead-form-42")
        .await;
    assert_eq!(echoed.header("x-request-id"), "lead-form-42");
}

#[tokio::test]
async fn test_error_details_shown_outside_production() {
    let app = setup_test_app().await;

    let response = app.client().post("/api/leads").json(&json!(["not", "an", "object"])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("INVALID_INPUT"));
    assert_eq!(body["error_type"], json!("InvalidInput"));
    assert!(body["details"].as_str().unwrap().contains("JSON object"));
}

#[tokio::test]
async fn test_error_details_hidden_in_production() {
    let app = helpers::setup_test_app_with(|config| {
        config.server.environment = "production".to_string();
    })
    .await;

    let response = app.client().post("/api/leads").json(&json!(["not", "an", "object"])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], json!("Lead payload must be a JSON object"));
    assert_eq!(body["code"], json!("INVALID_INPUT"));
    assert!(body.get("details").is_none());
    assert!(body.get("error_type").is_none());

    let unknown = app.client().get("/api/files").add_query_param("type", "videos").await;
    unknown.assert_status(StatusCode::BAD_REQUEST);
    assert!(unknown.json::<Value>().get("details").is_none());
}
