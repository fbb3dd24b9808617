//! Web API module for Depot.
//!
//! REST API over axum: passcode sign-in with cookie sessions, file
//! upload/listing/sharing, and storage usage.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod revalidate;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use revalidate::RouteVersions;
pub use router::{create_health_router, create_router, create_swagger_router};
pub use server::WebServer;
