//! HTTP-level integration tests for `POST /api/v1/exports`.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json};
use serde_json::json;

#[tokio::test]
async fn export_returns_eager_url() {
    let (app, _) = common::fake_media_app(Some(common::test_credentials())).await;
    let body = json!({
        "source_id": "clip.mov",
        "trim_start": 0.0,
        "trim_end": 2.0,
        "border_id": "Border_gold",
    });

    let response = post_json(app, "/api/v1/exports", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["url"],
        "https://res.cloudinary.com/demo/video/upload/\
         l_image:Border_gold,fl_relative,w_1.0,fl_layer_apply,so_0.00,eo_2.00,f_mp4,vc_h264,fl_attachment/clip.mp4"
    );
    assert_eq!(
        json["data"]["filename"],
        "subclip_0.00s_to_2.00s_duration_2.00s.mp4"
    );
}

#[tokio::test]
async fn export_without_credentials_returns_503() {
    let (app, _) = common::fake_media_app(None).await;

    let response = post_json(app, "/api/v1/exports", json!({ "source_id": "clip" })).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "NOT_CONFIGURED");
}

#[tokio::test]
async fn export_rejects_empty_source_id() {
    let (app, _) = common::fake_media_app(Some(common::test_credentials())).await;

    let response = post_json(app, "/api/v1/exports", json!({ "source_id": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
