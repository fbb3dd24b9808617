//! Authentication handlers.

use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::web::dto::{
    ApiResponse, SendPasscodeRequest, SendPasscodeResponse, SessionResponse, UserResponse,
    ValidatedJson, VerifyPasscodeRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::OptionalSessionUser;

/// Where sign-out lands, whatever happened to the session.
const SIGN_OUT_REDIRECT: &str = "/sign-in";

/// Build the session cookie: path-scoped, HttpOnly, Secure, SameSite=Strict.
fn session_cookie(name: &str, secret: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), secret))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

/// A cookie matching the session cookie's name and path, for removal.
fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .build()
}

/// POST /api/auth/passcodes - Send a sign-in passcode by email.
#[utoipa::path(
    post,
    path = "/auth/passcodes",
    tag = "auth",
    request_body = SendPasscodeRequest,
    responses(
        (status = 200, description = "Passcode sent", body = SendPasscodeResponse),
        (status = 404, description = "Unknown email and no full name given"),
        (status = 422, description = "Validation failed"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn send_passcode(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SendPasscodeRequest>,
) -> Result<Json<ApiResponse<SendPasscodeResponse>>, ApiError> {
    let account_id = state
        .auth_service()
        .send_passcode(&req.email, req.full_name.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to send passcode: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(ApiResponse::new(SendPasscodeResponse { account_id })))
}

/// POST /api/auth/sessions - Verify a passcode and open a session.
#[utoipa::path(
    post,
    path = "/auth/sessions",
    tag = "auth",
    request_body = VerifyPasscodeRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid or expired passcode"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn verify_passcode(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<VerifyPasscodeRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let (user, secret) = state
        .auth_service()
        .verify_passcode(&req.account_id, &req.passcode)
        .await
        .map_err(|e| {
            tracing::warn!("Passcode verification failed: {}", e);
            ApiError::from(e)
        })?;

    let jar = jar.add(session_cookie(&state.auth_config.cookie_name, secret));

    Ok((
        jar,
        Json(ApiResponse::new(SessionResponse {
            user: UserResponse::from_user(&user),
        })),
    ))
}

/// GET /api/auth/me - The current user, or null when not signed in.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user (null data when signed out)", body = UserResponse)
    )
)]
pub async fn me(
    OptionalSessionUser(user): OptionalSessionUser,
) -> Json<ApiResponse<Option<UserResponse>>> {
    Json(ApiResponse::new(
        user.as_ref().map(UserResponse::from_user),
    ))
}

/// POST /api/auth/sign-out - Delete the session and clear the cookie.
///
/// Redirects unconditionally; a sign-out with a dead or missing session
/// still clears the cookie and lands on the sign-in page.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    tag = "auth",
    responses(
        (status = 303, description = "Session cleared; redirected to sign-in")
    )
)]
pub async fn sign_out(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(&state.auth_config.cookie_name) {
        let secret = cookie.value().to_string();
        state.auth_service().sign_out(&secret).await;
    }

    let jar = jar.remove(removal_cookie(&state.auth_config.cookie_name));

    (jar, Redirect::to(SIGN_OUT_REDIRECT))
}
