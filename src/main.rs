use std::sync::Arc;

use tracing::info;

use depot::auth::LogMailer;
use depot::{BlobStorage, Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = depot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        depot::logging::init_console_only(&config.logging.level);
    }

    info!("Depot - file storage and sharing server");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            eprintln!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let storage = match BlobStorage::new(&config.storage.path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            eprintln!("Failed to initialize blob storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Blob storage at {}", config.storage.path);

    let server = match WebServer::new(&config, db, storage, Arc::new(LogMailer)) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
