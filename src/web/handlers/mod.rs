//! API handlers for the Depot web API.

pub mod auth;
pub mod file;
pub mod usage;

pub use auth::*;
pub use file::*;
pub use usage::*;

use std::sync::Arc;

use crate::auth::{AuthService, PasscodeMailer};
use crate::config::{AuthConfig, Config};
use crate::db::Database;
use crate::file::{BlobStorage, FileService};
use crate::web::middleware::RateLimitState;
use crate::web::revalidate::RouteVersions;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Blob storage.
    pub storage: Arc<BlobStorage>,
    /// Passcode delivery.
    pub mailer: Arc<dyn PasscodeMailer>,
    /// Authentication settings.
    pub auth_config: AuthConfig,
    /// Maximum upload size in bytes.
    pub max_upload_bytes: u64,
    /// Per-user quota in bytes.
    pub quota_bytes: u64,
    /// Public base URL for download links.
    pub base_url: String,
    /// Route revalidation counters.
    pub route_versions: Arc<RouteVersions>,
    /// Per-IP rate limiters.
    pub rate_limits: Arc<RateLimitState>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        storage: Arc<BlobStorage>,
        mailer: Arc<dyn PasscodeMailer>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            storage,
            mailer,
            auth_config: config.auth.clone(),
            max_upload_bytes: config.storage.max_upload_bytes(),
            quota_bytes: config.storage.quota_bytes,
            base_url: config.server.base_url.clone(),
            route_versions: Arc::new(RouteVersions::new()),
            rate_limits: Arc::new(RateLimitState::new(
                config.server.passcode_rate_limit,
                config.server.api_rate_limit,
            )),
        }
    }

    /// Authentication service over this state.
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&self.db, self.mailer.as_ref(), &self.auth_config)
    }

    /// File service over this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(
            &self.db,
            &self.storage,
            self.max_upload_bytes,
            self.quota_bytes,
        )
    }
}
