//! Integration tests for `MediaClient` against an in-process fake of the
//! media service.

use std::collections::HashMap;
use std::net::SocketAddr;

use assert_matches::assert_matches;
use axum::extract::{Form, Multipart};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use framecut_cloud::{MediaApiError, MediaClient, MediaConfig};
use framecut_core::signing::ApiCredentials;
use framecut_core::transformation::{build_delivery_url, EditRequest};

const VIDEO_BYTES: &[u8] = b"not really an mp4";

async fn fake_upload(mut multipart: Multipart) -> (StatusCode, Json<serde_json::Value>) {
    let mut fields = HashMap::new();
    let mut file_len = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            file_len = field.bytes().await.unwrap().len();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }

    if fields.get("upload_preset").map(String::as_str) != Some("video_borders") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Upload preset not found" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "public_id": "uploaded123",
            "secure_url": "https://res.cloudinary.com/demo/video/upload/v1/uploaded123.mov",
            "bytes": file_len,
            "resource_type": fields.get("resource_type"),
        })),
    )
}

async fn fake_explicit(Form(fields): Form<HashMap<String, String>>) -> Json<serde_json::Value> {
    assert_eq!(fields.get("api_key").map(String::as_str), Some("key"));
    assert!(fields.contains_key("signature"));
    let eager = fields.get("eager").cloned().unwrap_or_default();
    let public_id = fields.get("public_id").cloned().unwrap_or_default();
    Json(json!({
        "eager": [{
            "secure_url": format!("https://res.cloudinary.com/demo/video/upload/{eager}/{public_id}.mp4")
        }]
    }))
}

async fn fake_explicit_empty() -> Json<serde_json::Value> {
    Json(json!({ "eager": [] }))
}

async fn fake_delivery() -> &'static [u8] {
    VIDEO_BYTES
}

async fn spawn_fake(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn client_for(router: Router, credentials: Option<ApiCredentials>) -> MediaClient {
    let addr = spawn_fake(router).await;
    let mut config = MediaConfig::new("demo");
    config.api_base = format!("http://{addr}");
    config.delivery_host = format!("http://{addr}");
    config.credentials = credentials;
    MediaClient::new(config).unwrap()
}

fn credentials() -> Option<ApiCredentials> {
    Some(ApiCredentials {
        api_key: "key".to_string(),
        api_secret: "secret".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_returns_public_id() {
    let router = Router::new().route("/v1_1/demo/video/upload", post(fake_upload));
    let client = client_for(router, None).await;

    let uploaded = client
        .upload_video("clip.mov".into(), Some("video/quicktime".into()), VIDEO_BYTES.to_vec())
        .await
        .unwrap();

    assert_eq!(uploaded.public_id, "uploaded123");
    assert_eq!(uploaded.bytes, Some(VIDEO_BYTES.len() as u64));
}

#[tokio::test]
async fn upload_surfaces_service_errors() {
    let router = Router::new().route("/v1_1/demo/video/upload", post(fake_upload));
    let addr = spawn_fake(router).await;
    let mut config = MediaConfig::new("demo");
    config.api_base = format!("http://{addr}");
    config.upload_preset = "missing".to_string();
    let client = MediaClient::new(config).unwrap();

    let result = client
        .upload_video("clip.mp4".into(), None, VIDEO_BYTES.to_vec())
        .await;

    assert_matches!(
        result,
        Err(MediaApiError::ApiError { status: 400, ref body }) if body.contains("preset")
    );
}

// ---------------------------------------------------------------------------
// Explicit transformation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn explicit_transform_returns_eager_url() {
    let router = Router::new().route("/v1_1/demo/video/explicit", post(fake_explicit));
    let client = client_for(router, credentials()).await;

    let request = EditRequest::new("clip.mp4").with_trim(1.0, 3.0);
    let url = client.explicit_transform(&request).await.unwrap();

    assert_eq!(
        url,
        "https://res.cloudinary.com/demo/video/upload/so_1.00,eo_3.00,f_mp4,vc_h264,fl_attachment/clip.mp4"
    );
}

#[tokio::test]
async fn explicit_transform_without_result_fails() {
    let router = Router::new().route("/v1_1/demo/video/explicit", post(fake_explicit_empty));
    let client = client_for(router, credentials()).await;

    let result = client.explicit_transform(&EditRequest::new("clip")).await;
    assert_matches!(result, Err(MediaApiError::MissingEagerResult));
}

#[tokio::test]
async fn explicit_transform_rejects_empty_source() {
    let client = client_for(Router::new(), credentials()).await;
    let result = client.explicit_transform(&EditRequest::new("")).await;
    assert_matches!(result, Err(MediaApiError::Core(_)));
}

// ---------------------------------------------------------------------------
// HEAD check & download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn head_request_reports_status() {
    let router = Router::new().route("/demo/video/upload/{*rest}", get(fake_delivery));
    let client = client_for(router, None).await;
    let target = client.delivery_target();

    let good = build_delivery_url(&target, &EditRequest::new("clip")).unwrap();
    let probe = client.probe(&good).await.unwrap();
    assert!(probe.ok);
    assert_eq!(probe.status, 200);

    let missing = format!("{}/nowhere.mp4", target.host);
    let probe = client.probe(&missing).await.unwrap();
    assert!(!probe.ok);
    assert_eq!(probe.status, 404);
}

#[tokio::test]
async fn download_writes_file() {
    let router = Router::new().route("/demo/video/upload/{*rest}", get(fake_delivery));
    let client = client_for(router, None).await;
    let url = build_delivery_url(
        &client.delivery_target(),
        &EditRequest::new("clip").with_force_download(true),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    let written = client.download_to_file(&url, &path).await.unwrap();

    assert_eq!(written, VIDEO_BYTES.len() as u64);
    assert_eq!(std::fs::read(&path).unwrap(), VIDEO_BYTES);
}

#[tokio::test]
async fn download_of_missing_resource_fails() {
    let client = client_for(Router::new(), None).await;
    let url = format!("{}/demo/video/upload/clip.mp4", client.config().delivery_host);

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .download_to_file(&url, &dir.path().join("clip.mp4"))
        .await;
    assert_matches!(result, Err(MediaApiError::ApiError { status: 404, .. }));
}
