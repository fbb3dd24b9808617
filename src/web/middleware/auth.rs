//! Session cookie authentication extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::db::User;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for authenticated users.
///
/// Reads the session cookie, resolves it against the session store, and
/// rejects with 401 when no valid session exists.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let secret = session_secret(parts, state)
                .ok_or_else(|| ApiError::unauthorized("Not signed in"))?;

            let user = state
                .auth_service()
                .current_user(&secret)
                .await
                .ok_or_else(|| ApiError::unauthorized("Not signed in"))?;

            Ok(SessionUser(user))
        })
    }
}

/// Optional authentication extractor.
///
/// Like `SessionUser` but resolves to `None` instead of rejecting; every
/// lookup failure reads as absence.
#[derive(Debug, Clone)]
pub struct OptionalSessionUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for OptionalSessionUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = match session_secret(parts, state) {
                Some(secret) => state.auth_service().current_user(&secret).await,
                None => None,
            };

            Ok(OptionalSessionUser(user))
        })
    }
}

/// Read the session secret from the request's cookies.
fn session_secret(parts: &Parts, state: &AppState) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(&state.auth_config.cookie_name)
        .map(|cookie| cookie.value().to_string())
}
