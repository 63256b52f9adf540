#![allow(dead_code)]

//! Test helpers: build the real router over a temporary working tree.
//!
//! Run from workspace root: `cargo test -p stormlead-api`.

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stormlead_api::setup::build_app;
use stormlead_api::AppState;
use stormlead_core::Config;
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<!doctype html><title>Storm damage roof inspection</title>";
pub const ADMIN_HTML: &str = "<!doctype html><title>Leads admin</title>";

/// Test application: server, state, and the temporary tree it owns.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn leads_file(&self) -> PathBuf {
        self.state.paths.leads_file.clone()
    }
}

/// Setup test app with default configuration rooted in a temp directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = Config::with_root(temp_dir.path());
    config.logging.log_to_file = false;
    configure(&mut config);

    let public = temp_dir.path().join("public");
    std::fs::create_dir_all(&public).expect("Failed to create public dir");
    std::fs::write(public.join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    std::fs::write(public.join("admin.html"), ADMIN_HTML).expect("Failed to write admin.html");

    let (state, router) = build_app(config).await.expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
