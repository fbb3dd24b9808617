//! Authentication module for Depot.
//!
//! Passwordless sign-in: a one-time passcode is emailed to the user, and a
//! successful verification mints an opaque session secret that the web layer
//! persists in a cookie.

mod mailer;
mod secret;
mod service;

pub use mailer::{LogMailer, MemoryMailer, PasscodeMailer};
pub use secret::{generate_passcode, generate_session_secret, hash_secret};
pub use service::AuthService;
