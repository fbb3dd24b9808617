//! Web API storage usage tests.

mod common;

use axum::http::header::COOKIE;
use axum::http::StatusCode;
use serde_json::Value;

use common::{session_header, sign_in, spawn_app, upload_file};

fn kind_entry<'a>(body: &'a Value, kind: &str) -> &'a Value {
    body["data"]["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .find(|k| k["kind"] == kind)
        .unwrap()
}

#[tokio::test]
async fn test_usage_requires_session() {
    let app = spawn_app().await;

    let response = app.server.get("/api/usage").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_usage_has_zero_buckets() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["used"], 0);
    assert_eq!(body["data"]["quota"].as_i64().unwrap(), 2 * 1024 * 1024 * 1024);
    assert_eq!(body["data"]["kinds"].as_array().unwrap().len(), 5);

    let images = kind_entry(&body, "image");
    assert_eq!(images["size"], 0);
    assert_eq!(images["count"], 0);
    assert!(images.get("latest_date").is_none() || images["latest_date"].is_null());
}

#[tokio::test]
async fn test_three_documents_fold_into_document_bucket() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    upload_file(&app, &secret, "a.pdf", &[0u8; 10]).await;
    upload_file(&app, &secret, "b.pdf", &[0u8; 20]).await;
    let last = upload_file(&app, &secret, "c.pdf", &[0u8; 30]).await;

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&secret))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let docs = kind_entry(&body, "document");

    assert_eq!(docs["size"], 60);
    assert_eq!(docs["count"], 3);
    // Latest date is the most recently updated file's timestamp
    assert_eq!(docs["latest_date"], last["updated_at"]);

    assert_eq!(body["data"]["used"], 60);
    let quota = body["data"]["quota"].as_i64().unwrap();
    assert_eq!(body["data"]["remaining"].as_i64().unwrap(), quota - 60);
}

#[tokio::test]
async fn test_each_file_lands_in_exactly_one_bucket() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    upload_file(&app, &secret, "pic.png", &[0u8; 11]).await;
    upload_file(&app, &secret, "song.mp3", &[0u8; 13]).await;
    upload_file(&app, &secret, "clip.mp4", &[0u8; 17]).await;
    upload_file(&app, &secret, "data.xyz", &[0u8; 19]).await;

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&secret))
        .await;
    let body: Value = response.json();

    let by_kind_total: i64 = body["data"]["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["size"].as_i64().unwrap())
        .sum();

    assert_eq!(by_kind_total, 60);
    assert_eq!(body["data"]["used"], 60);
    assert_eq!(kind_entry(&body, "image")["size"], 11);
    assert_eq!(kind_entry(&body, "audio")["size"], 13);
    assert_eq!(kind_entry(&body, "video")["size"], 17);
    assert_eq!(kind_entry(&body, "other")["size"], 19);
}

#[tokio::test]
async fn test_shared_files_count_against_owner_only() {
    let app = spawn_app().await;
    let owner = sign_in(&app, "owner@example.com", "Owner").await;
    let friend = sign_in(&app, "friend@example.com", "Friend").await;

    let uploaded = upload_file(&app, &owner, "shared.pdf", &[0u8; 25]).await;
    let id = uploaded["id"].as_i64().unwrap();

    app.server
        .put(&format!("/api/files/{id}/collaborators"))
        .add_header(COOKIE, session_header(&owner))
        .json(&serde_json::json!({ "emails": ["friend@example.com"] }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&friend))
        .await;
    assert_eq!(response.json::<Value>()["data"]["used"], 0);

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&owner))
        .await;
    assert_eq!(response.json::<Value>()["data"]["used"], 25);
}

#[tokio::test]
async fn test_rename_moves_latest_date_forward() {
    let app = spawn_app().await;
    let secret = sign_in(&app, "owner@example.com", "Owner").await;

    let first = upload_file(&app, &secret, "old.pdf", &[0u8; 10]).await;
    upload_file(&app, &secret, "new.pdf", &[0u8; 10]).await;

    // Renaming the older file bumps its updated_at
    let id = first["id"].as_i64().unwrap();
    let renamed = app
        .server
        .patch(&format!("/api/files/{id}"))
        .add_header(COOKIE, session_header(&secret))
        .json(&serde_json::json!({ "name": "older-but-touched" }))
        .await;
    renamed.assert_status_ok();
    let renamed_updated_at = renamed.json::<Value>()["data"]["updated_at"].clone();

    let response = app
        .server
        .get("/api/usage")
        .add_header(COOKIE, session_header(&secret))
        .await;
    let body: Value = response.json();
    let docs = kind_entry(&body, "document");

    assert_eq!(docs["latest_date"], renamed_updated_at);
}
