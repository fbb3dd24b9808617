//! Web API file tests.
//!
//! Upload, listing with filters, rename, sharing, download, and delete.

mod common;

use axum::http::header::COOKIE;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{blob_count, session_header, sign_in, spawn_app, spawn_app_with, upload_file};
use depot::Config;

#[tokio::test]
async fn test_upload_requires_session() {
    let app = spawn_app().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"data".to_vec()).file_name("a.txt".to_string()),
    );
    let response = app.server.post("/api/files").multipart(form).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_and_list() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let uploaded = upload_file(&app, &secret, "report.pdf", b"pdf-bytes").await;
    assert_eq!(uploaded["name"], "report.pdf");
    assert_eq!(uploaded["kind"], "document");
    assert_eq!(uploaded["extension"], "pdf");
    assert_eq!(uploaded["size"], 9);
    assert!(uploaded["url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/api/files/{}/download", uploaded["id"])));

    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "report.pdf");
    // Owner resolution attaches the uploader
    assert_eq!(files[0]["owner"]["email"], "owner@example.com");
    assert_eq!(files[0]["owner"]["full_name"], "Owner");
}

#[tokio::test]
async fn test_upload_then_delete_leaves_no_residue() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let uploaded = upload_file(&app, &secret, "temp.txt", b"temporary").await;
    let id = uploaded["id"].as_i64().unwrap();
    assert_eq!(blob_count(&app.blob_root), 1);

    let response = app
        .server
        .delete(&format!("/api/files/{id}"))
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    // No metadata document and no bucket object remain
    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .await;
    assert!(response.json::<Value>()["data"].as_array().unwrap().is_empty());
    assert_eq!(blob_count(&app.blob_root), 0);
}

#[tokio::test]
async fn test_search_returns_only_matching_names() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    upload_file(&app, &secret, "holiday-photo.png", b"img").await;
    upload_file(&app, &secret, "invoice.pdf", b"doc").await;
    upload_file(&app, &secret, "photo-album.zip", b"zip").await;

    let response = app
        .server
        .get("/api/files")
        .add_query_param("search", "photo")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();

    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.contains("photo")));
}

#[tokio::test]
async fn test_kind_filter_sort_and_limit() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    upload_file(&app, &secret, "small.png", &[0u8; 10]).await;
    upload_file(&app, &secret, "large.png", &[0u8; 100]).await;
    upload_file(&app, &secret, "track.mp3", &[0u8; 50]).await;

    let response = app
        .server
        .get("/api/files")
        .add_query_param("kind", "image")
        .add_query_param("sort", "size-desc")
        .add_query_param("limit", "1")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "large.png");
}

#[tokio::test]
async fn test_invalid_query_parameters_are_rejected() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let response = app
        .server
        .get("/api/files")
        .add_query_param("kind", "hologram")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/api/files")
        .add_query_param("sort", "alphabetical")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_preserves_extension() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let uploaded = upload_file(&app, &secret, "draft.pdf", b"pdf").await;
    let id = uploaded["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/files/{id}"))
        .add_header(COOKIE, session_header(&secret))
        .json(&json!({ "name": "final-report" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "final-report.pdf");
    assert_eq!(body["data"]["extension"], "pdf");
}

#[tokio::test]
async fn test_share_flow() {
    let app = spawn_app().await;
    let owner = sign_in(&app, "owner@example.com", "Owner").await;
    let friend = sign_in(&app, "friend@example.com", "Friend").await;

    let uploaded = upload_file(&app, &owner, "shared.txt", b"shared-bytes").await;
    let id = uploaded["id"].as_i64().unwrap();

    // Friend can't see it yet
    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&friend))
        .await;
    assert!(response.json::<Value>()["data"].as_array().unwrap().is_empty());

    // Owner shares
    let response = app
        .server
        .put(&format!("/api/files/{id}/collaborators"))
        .add_header(COOKIE, session_header(&owner))
        .json(&json!({ "emails": ["friend@example.com"] }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["collaborators"],
        json!(["friend@example.com"])
    );

    // Friend now sees and can download the file
    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&friend))
        .await;
    let files = response.json::<Value>();
    let files = files["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "shared.txt");

    let response = app
        .server
        .get(&format!("/api/files/{id}/download"))
        .add_header(COOKIE, session_header(&friend))
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().to_vec(), b"shared-bytes".to_vec());

    // But the friend may not delete or re-share
    let response = app
        .server
        .delete(&format!("/api/files/{id}"))
        .add_header(COOKIE, session_header(&friend))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&format!("/api/files/{id}/collaborators"))
        .add_header(COOKIE, session_header(&friend))
        .json(&json!({ "emails": [] }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Owner unshares; the friend loses access
    let response = app
        .server
        .put(&format!("/api/files/{id}/collaborators"))
        .add_header(COOKIE, session_header(&owner))
        .json(&json!({ "emails": [] }))
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/files/{id}/download"))
        .add_header(COOKIE, session_header(&friend))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_collaborator_email_rejected() {
    let app = spawn_app().await;
    let owner = sign_in(&app, "owner@example.com", "Owner").await;

    let uploaded = upload_file(&app, &owner, "a.txt", b"a").await;
    let id = uploaded["id"].as_i64().unwrap();

    let response = app
        .server
        .put(&format!("/api/files/{id}/collaborators"))
        .add_header(COOKIE, session_header(&owner))
        .json(&json!({ "emails": ["not-an-email"] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_download_sets_content_headers() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let uploaded = upload_file(&app, &secret, "notes.txt", b"text-content").await;
    let id = uploaded["id"].as_i64().unwrap();

    let response = app
        .server
        .get(&format!("/api/files/{id}/download"))
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("notes.txt"));

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let response = app
        .server
        .get("/api/files/99999/download")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quota_is_enforced() {
    let mut config = Config::default();
    config.storage.quota_bytes = 100;
    let app = spawn_app_with(config).await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    upload_file(&app, &secret, "first.bin", &[0u8; 80]).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 40]).file_name("second.bin".to_string()),
    );
    let response = app
        .server
        .post("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    // The rejected upload left no blob behind
    assert_eq!(blob_count(&app.blob_root), 1);
}

#[tokio::test]
async fn test_route_version_header_bumps_on_mutation() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .await;
    let before: u64 = response
        .headers()
        .get("x-route-version")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    upload_file(&app, &secret, "bump.txt", b"x").await;

    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .await;
    let after: u64 = response
        .headers()
        .get("x-route-version")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(after, before + 1);
}

#[tokio::test]
async fn test_upload_with_explicit_display_name() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(b"data".to_vec()).file_name("ugly-blob-name.dat".to_string()),
        )
        .add_part("name", Part::text("Quarterly Numbers.dat"));

    let response = app
        .server
        .post("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .multipart(form)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["name"],
        "Quarterly Numbers.dat"
    );
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let form = MultipartForm::new().add_part("name", Part::text("no file here"));
    let response = app
        .server
        .post("/api/files")
        .add_header(COOKIE, session_header(&secret))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
