//! Storage usage handler.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, UsageResponse};
use crate::web::error::ApiError;
use crate::web::handlers::file::with_route_version;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionUser;
use crate::web::revalidate::USAGE_ROUTE;

/// GET /api/usage - Per-kind storage usage against the quota.
#[utoipa::path(
    get,
    path = "/usage",
    tag = "usage",
    responses(
        (status = 200, description = "Usage summary", body = UsageResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Response, ApiError> {
    let summary = state.file_service().usage(&user).await.map_err(|e| {
        tracing::error!("Failed to compute usage: {}", e);
        ApiError::from(e)
    })?;

    let response = Json(ApiResponse::new(UsageResponse::from_summary(&summary))).into_response();
    Ok(with_route_version(&state, USAGE_ROUTE, response))
}
