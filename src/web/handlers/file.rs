//! File handlers for the Depot web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::file::{FileKind, FileQuery, FileSort, UploadRequest};
use crate::web::dto::{
    ApiResponse, FileResponse, ListFilesQuery, RenameFileRequest, UpdateCollaboratorsRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionUser;
use crate::web::revalidate::{FILES_ROUTE, ROUTE_VERSION_HEADER, USAGE_ROUTE};

/// Largest LIMIT a listing will accept.
const MAX_LIST_LIMIT: i64 = 1000;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Strips control characters (header injection), escapes quotes and
/// backslashes, and uses the RFC 5987 `filename*` parameter for non-ASCII
/// names.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Translate wire query parameters into a repository query.
fn parse_list_query(params: &ListFilesQuery) -> Result<FileQuery, ApiError> {
    let mut kinds = Vec::new();
    if let Some(ref kind_param) = params.kind {
        for part in kind_param.split(',').filter(|p| !p.trim().is_empty()) {
            let kind = FileKind::parse(part.trim())
                .ok_or_else(|| ApiError::bad_request(format!("unknown kind: {part}")))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }

    let sort = match params.sort.as_deref() {
        Some(s) => FileSort::parse(s)
            .ok_or_else(|| ApiError::bad_request(format!("unknown sort: {s}")))?,
        None => FileSort::default(),
    };

    let limit = match params.limit {
        Some(limit) if limit <= 0 => {
            return Err(ApiError::bad_request("limit must be positive"));
        }
        Some(limit) => Some(limit.min(MAX_LIST_LIMIT)),
        None => None,
    };

    Ok(FileQuery {
        kinds,
        search: params.search.clone().filter(|s| !s.trim().is_empty()),
        sort,
        limit,
    })
}

/// Bump the revalidation counters for routes a file mutation invalidates.
fn bump_file_routes(state: &AppState) {
    state.route_versions.bump(FILES_ROUTE);
    state.route_versions.bump(USAGE_ROUTE);
}

/// Attach a route's current generation to a response.
pub(crate) fn with_route_version(state: &AppState, route: &str, mut response: Response) -> Response {
    let version = state.route_versions.get(route);
    if let Ok(value) = HeaderValue::from_str(&version.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(ROUTE_VERSION_HEADER), value);
    }
    response
}

/// POST /api/files - Upload a file (multipart).
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Missing or invalid multipart fields"),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Quota exceeded")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut display_name: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
                content = Some(bytes.to_vec());
            }
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid name field: {e}")))?;
                display_name = Some(text);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("missing file field"))?;
    let name = display_name
        .filter(|n| !n.trim().is_empty())
        .or(file_name)
        .ok_or_else(|| ApiError::bad_request("missing filename"))?;

    let record = state
        .file_service()
        .upload(&UploadRequest::new(name, content), &user)
        .await
        .map_err(|e| {
            tracing::error!("Upload failed: {}", e);
            ApiError::from(e)
        })?;

    bump_file_routes(&state);

    Ok(Json(ApiResponse::new(FileResponse::from_record(
        &record,
        &state.base_url,
    ))))
}

/// GET /api/files - List accessible files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(
        ("kind" = Option<String>, Query, description = "Comma-separated kind filter"),
        ("search" = Option<String>, Query, description = "Name substring filter"),
        ("sort" = Option<String>, Query, description = "Sort order"),
        ("limit" = Option<i64>, Query, description = "Maximum rows")
    ),
    responses(
        (status = 200, description = "Accessible files", body = Vec<FileResponse>),
        (status = 400, description = "Invalid query parameter"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Query(params): Query<ListFilesQuery>,
) -> Result<Response, ApiError> {
    let query = parse_list_query(&params)?;

    let listed = state.file_service().list(&user, &query).await.map_err(|e| {
        tracing::error!("Failed to list files: {}", e);
        ApiError::from(e)
    })?;

    let files: Vec<FileResponse> = listed
        .iter()
        .map(|l| FileResponse::from_listed(l, &state.base_url))
        .collect();

    let response = Json(ApiResponse::new(files)).into_response();
    Ok(with_route_version(&state, FILES_ROUTE, response))
}

/// GET /api/files/:id/download - Download a file's content.
#[utoipa::path(
    get,
    path = "/files/{id}/download",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "No access to this file"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (record, content) = state.file_service().download(&user, id).await?;

    let mime = mime_guess::from_path(&record.name).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.name),
        )
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// PATCH /api/files/:id - Rename a file.
#[utoipa::path(
    patch,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "File renamed", body = FileResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Only the owner may rename"),
        (status = 404, description = "File not found")
    )
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state.file_service().rename(&user, id, &req.name).await?;

    bump_file_routes(&state);

    Ok(Json(ApiResponse::new(FileResponse::from_record(
        &record,
        &state.base_url,
    ))))
}

/// PUT /api/files/:id/collaborators - Replace the collaborator list.
#[utoipa::path(
    put,
    path = "/files/{id}/collaborators",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = UpdateCollaboratorsRequest,
    responses(
        (status = 200, description = "Collaborators updated", body = FileResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Only the owner may share"),
        (status = 404, description = "File not found")
    )
)]
pub async fn update_collaborators(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCollaboratorsRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state
        .file_service()
        .update_collaborators(&user, id, &req.emails)
        .await?;

    bump_file_routes(&state);

    Ok(Json(ApiResponse::new(FileResponse::from_record(
        &record,
        &state.base_url,
    ))))
}

/// DELETE /api/files/:id - Delete a file and its blob.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Only the owner may delete"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.file_service().delete(&user, id).await?;

    bump_file_routes(&state);

    Ok(Json(ApiResponse::new(())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain_ascii() {
        assert_eq!(
            content_disposition_header("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_strips_header_injection() {
        let value = content_disposition_header("evil\r\nSet-Cookie: x.txt");
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
    }

    #[test]
    fn test_content_disposition_quotes_escaped() {
        let value = content_disposition_header("we\"ird.txt");
        assert!(value.contains("we_ird.txt"));
    }

    #[test]
    fn test_content_disposition_unicode_uses_rfc5987() {
        let value = content_disposition_header("日本語.txt");
        assert!(value.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_parse_list_query_defaults() {
        let query = parse_list_query(&ListFilesQuery::default()).unwrap();
        assert!(query.kinds.is_empty());
        assert!(query.search.is_none());
        assert_eq!(query.sort, FileSort::DateDesc);
        assert!(query.limit.is_none());
    }

    #[test]
    fn test_parse_list_query_kinds() {
        let params = ListFilesQuery {
            kind: Some("image,video".to_string()),
            ..Default::default()
        };
        let query = parse_list_query(&params).unwrap();
        assert_eq!(query.kinds, vec![FileKind::Image, FileKind::Video]);

        let bad = ListFilesQuery {
            kind: Some("image,bogus".to_string()),
            ..Default::default()
        };
        assert!(parse_list_query(&bad).is_err());
    }

    #[test]
    fn test_parse_list_query_limit_bounds() {
        let zero = ListFilesQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(parse_list_query(&zero).is_err());

        let huge = ListFilesQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(parse_list_query(&huge).unwrap().limit, Some(MAX_LIST_LIMIT));
    }

    #[test]
    fn test_parse_list_query_unknown_sort() {
        let params = ListFilesQuery {
            sort: Some("alphabetical".to_string()),
            ..Default::default()
        };
        assert!(parse_list_query(&params).is_err());
    }
}
