//! Router configuration for the Depot web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    delete_file, download_file, get_usage, list_files, me, rename_file, send_passcode, sign_out,
    update_collaborators, upload_file, verify_passcode, AppState,
};
use super::middleware::{create_cors_layer, passcode_rate_limit};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::auth::send_passcode,
        super::handlers::auth::verify_passcode,
        super::handlers::auth::me,
        super::handlers::auth::sign_out,
        super::handlers::file::upload_file,
        super::handlers::file::list_files,
        super::handlers::file::download_file,
        super::handlers::file::rename_file,
        super::handlers::file::update_collaborators,
        super::handlers::file::delete_file,
        super::handlers::usage::get_usage,
    ),
    components(schemas(
        crate::web::dto::request::SendPasscodeRequest,
        crate::web::dto::request::VerifyPasscodeRequest,
        crate::web::dto::request::RenameFileRequest,
        crate::web::dto::request::UpdateCollaboratorsRequest,
        crate::web::dto::response::UserResponse,
        crate::web::dto::response::SendPasscodeResponse,
        crate::web::dto::response::SessionResponse,
        crate::web::dto::response::OwnerResponse,
        crate::web::dto::response::FileResponse,
        crate::web::dto::response::KindUsageResponse,
        crate::web::dto::response::UsageResponse,
    )),
    tags(
        (name = "auth", description = "Passcode sign-in and sessions"),
        (name = "files", description = "File upload, listing, and sharing"),
        (name = "usage", description = "Storage usage")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // Multipart adds its own framing on top of the payload
    let body_limit = (app_state.max_upload_bytes as usize).saturating_add(1024 * 1024);

    // Passcode sends get their own per-IP limiter
    let passcode_routes = Router::new()
        .route("/passcodes", post(send_passcode))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            passcode_rate_limit,
        ));

    let auth_routes = Router::new()
        .merge(passcode_routes)
        .route("/sessions", post(verify_passcode))
        .route("/me", get(me))
        .route("/sign-out", post(sign_out));

    let file_routes = Router::new()
        .route("/", post(upload_file).get(list_files))
        .route("/:id", patch(rename_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/collaborators", put(update_collaborators));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes)
        .route("/usage", get(get_usage));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
