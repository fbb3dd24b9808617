//! Shared helpers for web API integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::header::COOKIE;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use depot::auth::MemoryMailer;
use depot::web::create_router;
use depot::web::handlers::AppState;
use depot::{BlobStorage, Config, Database};

/// A test server with its in-memory database, capture mailer, and blob dir.
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub mailer: Arc<MemoryMailer>,
    pub storage: Arc<BlobStorage>,
    pub blob_root: PathBuf,
    _temp_dir: TempDir,
}

/// Spawn a test app with a rate limit loose enough to stay out of the way.
pub async fn spawn_app() -> TestApp {
    let mut config = Config::default();
    config.server.passcode_rate_limit = 1000;
    spawn_app_with(config).await
}

/// Spawn a test app with a customized configuration.
pub async fn spawn_app_with(config: Config) -> TestApp {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = Arc::new(BlobStorage::new(temp_dir.path()).expect("Failed to create storage"));
    let mailer = Arc::new(MemoryMailer::new());

    let state = Arc::new(AppState::new(
        db.clone(),
        storage.clone(),
        mailer.clone(),
        &config,
    ));

    let router = create_router(state, &config.server.cors_origins);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        mailer,
        storage,
        blob_root: temp_dir.path().to_path_buf(),
        _temp_dir: temp_dir,
    }
}

/// Sign a user up (or in) and return the session cookie value.
pub async fn sign_in(app: &TestApp, email: &str, full_name: &str) -> String {
    let response = app
        .server
        .post("/api/auth/passcodes")
        .json(&json!({ "email": email, "full_name": full_name }))
        .await;
    response.assert_status_ok();

    let account_id = response.json::<Value>()["data"]["account_id"]
        .as_str()
        .expect("account_id in response")
        .to_string();

    let code = app
        .mailer
        .last_code_for(email)
        .expect("passcode should have been delivered");

    let response = app
        .server
        .post("/api/auth/sessions")
        .json(&json!({ "account_id": account_id, "passcode": code }))
        .await;
    response.assert_status_ok();

    response.cookie("depot_session").value().to_string()
}

/// Cookie header value for a session secret.
pub fn session_header(secret: &str) -> String {
    format!("depot_session={secret}")
}

/// Upload a file and return its JSON representation.
pub async fn upload_file(app: &TestApp, secret: &str, name: &str, content: &[u8]) -> Value {
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec()).file_name(name.to_string()),
    );

    let response = app
        .server
        .post("/api/files")
        .add_header(COOKIE, session_header(secret))
        .multipart(form)
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"].clone()
}

/// Count blobs stored under the blob root.
pub fn blob_count(root: &Path) -> usize {
    let mut count = 0;
    if let Ok(entries) = std::fs::read_dir(root) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                count += std::fs::read_dir(entry.path())
                    .map(|d| d.count())
                    .unwrap_or(0);
            }
        }
    }
    count
}
