//! Route configuration and setup

use crate::handlers;
use crate::middleware::{
    error_detail_middleware, request_id_middleware, ErrorDetailPolicy, RequestId,
};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use stormlead_core::Config;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let public_dir = state.paths.public.clone();

    // One request may carry up to max_files files of max_file_size each
    let upload_limit = config
        .upload
        .max_file_size
        .saturating_mul(config.upload.max_files.max(1));

    let app = api_routes(config.upload.max_file_size)
        .merge(upload_routes(upload_limit))
        .merge(page_routes(&public_dir))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .fallback_service(ServeDir::new(&public_dir))
        .layer(axum::middleware::from_fn_with_state(
            ErrorDetailPolicy::from_config(config),
            error_detail_middleware,
        ))
        .layer(DefaultBodyLimit::disable());

    let app = if config.security.cors_enabled {
        app.layer(setup_cors(config)?)
    } else {
        tracing::info!("CORS layer disabled");
        app
    };

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.0.as_str())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })),
        )
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// JSON API
fn api_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/leads",
            post(handlers::leads::submit_lead).get(handlers::leads::list_leads),
        )
        .route("/api/config", get(handlers::files::get_client_config))
        .route("/api/files", get(handlers::files::list_files))
        .route("/api/backup", post(handlers::maintenance::create_backup))
        .route("/api/storage", get(handlers::maintenance::storage_stats))
        .layer(RequestBodyLimitLayer::new(body_limit))
}

/// Multipart uploads, with a body limit sized for a full batch of files
fn upload_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload", post(handlers::upload::upload_files))
        .layer(RequestBodyLimitLayer::new(body_limit))
}

/// Landing page and admin page
fn page_routes(public_dir: &std::path::Path) -> Router<Arc<AppState>> {
    Router::new()
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .route_service("/admin", ServeFile::new(public_dir.join("admin.html")))
}
