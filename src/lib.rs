//! Depot - self-hosted file storage and sharing server.
//!
//! Users sign in with a one-time passcode delivered by email, upload files
//! into a sharded blob store, share them with other users by email, and
//! track storage usage against a quota.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{DepotError, Result};
pub use file::BlobStorage;
pub use web::WebServer;
