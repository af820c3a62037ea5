#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Form, Multipart, Path};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use framecut_api::config::ServerConfig;
use framecut_api::router::build_app_router;
use framecut_api::state::AppState;
use framecut_cloud::{MediaClient, MediaConfig};
use framecut_core::signing::ApiCredentials;
use framecut_core::upload::megabytes;

/// Body served by the fake delivery endpoint.
pub const VIDEO_BYTES: &[u8] = b"fake mp4 payload";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "framecut-test-boundary";

// ---------------------------------------------------------------------------
// Configuration and app
// ---------------------------------------------------------------------------

/// Media settings for the `demo` account on the public hosts.
///
/// Nothing is contacted unless a handler reaches the network.
pub fn demo_media_config() -> MediaConfig {
    MediaConfig::new("demo")
}

pub fn test_credentials() -> ApiCredentials {
    ApiCredentials {
        api_key: "key".to_string(),
        api_secret: "secret".to_string(),
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(media: MediaConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: megabytes(1),
        media,
    }
}

/// Build the full application router with all middleware layers.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(config: ServerConfig) -> Router {
    let media = MediaClient::new(config.media.clone()).unwrap();
    let state = AppState {
        config: Arc::new(config.clone()),
        media,
    };
    build_app_router(state, &config)
}

/// App against the public `demo` account, no credentials.
pub fn demo_app() -> Router {
    build_test_app(test_config(demo_media_config()))
}

// ---------------------------------------------------------------------------
// Fake media service
// ---------------------------------------------------------------------------

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
            "secure_url": "https://res.cloudinary.com/demo/video/upload/v1/uploaded123.mp4",
            "duration": 12.5,
            "format": "mp4",
            "bytes": file_len,
        })),
    )
}

async fn fake_explicit(Form(fields): Form<HashMap<String, String>>) -> Json<serde_json::Value> {
    let eager = fields.get("eager").cloned().unwrap_or_default();
    let public_id = fields.get("public_id").cloned().unwrap_or_default();
    Json(json!({
        "eager": [{
            "secure_url": format!("https://res.cloudinary.com/demo/video/upload/{eager}/{public_id}.mp4")
        }]
    }))
}

/// Delivery endpoint: rejects the legacy `e_overlay` grammar and any public
/// id containing `missing`.
async fn fake_delivery(Path(path): Path<String>) -> Response {
    if path.contains("e_overlay") || path.contains("missing") {
        return (StatusCode::NOT_FOUND, "Resource not found").into_response();
    }
    ([(CONTENT_TYPE, "video/mp4")], VIDEO_BYTES).into_response()
}

/// Spawn the fake media service on an ephemeral port.
pub async fn spawn_fake_media() -> SocketAddr {
    let router = Router::new()
        .route("/v1_1/demo/video/upload", post(fake_upload))
        .route("/v1_1/demo/video/explicit", post(fake_explicit))
        .route(
            "/demo/video/upload/{*path}",
            axum::routing::get(fake_delivery),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Media settings pointing both API and delivery at a fake service.
pub fn fake_media_config(addr: SocketAddr, credentials: Option<ApiCredentials>) -> MediaConfig {
    MediaConfig {
        delivery_host: format!("http://{addr}"),
        api_base: format!("http://{addr}"),
        credentials,
        ..MediaConfig::new("demo")
    }
}

/// App wired to a freshly spawned fake media service.
pub async fn fake_media_app(credentials: Option<ApiCredentials>) -> (Router, SocketAddr) {
    let addr = spawn_fake_media().await;
    let app = build_test_app(test_config(fake_media_config(addr, credentials)));
    (app, addr)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// A multipart body with a single part.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
