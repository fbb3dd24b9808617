//! Web server for Depot.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::PasscodeMailer;
use crate::config::Config;
use crate::db::Database;
use crate::file::BlobStorage;
use crate::{DepotError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_swagger_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Assembled router.
    router: Router,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &Config,
        db: Arc<Database>,
        storage: Arc<BlobStorage>,
        mailer: Arc<dyn PasscodeMailer>,
    ) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| DepotError::Config(format!("invalid server address: {e}")))?;

        let app_state = Arc::new(AppState::new(db, storage, mailer, config));
        app_state.rate_limits.clone().start_cleanup_task();

        let router = create_router(app_state, &config.server.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router());

        Ok(Self { addr, router })
    }

    /// Bind and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("Web server listening on {}", self.addr);

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}
