//! Middleware for the Depot web API.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{OptionalSessionUser, SessionUser};
pub use cors::create_cors_layer;
pub use rate_limit::{passcode_rate_limit, RateLimitState};
