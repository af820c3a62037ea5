use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Media account every URL is built against.
    pub cloud_name: String,
    /// Whether signed URLs and exports are available.
    pub signing_enabled: bool,
}

/// GET /health -- returns service status and media configuration summary.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let media = state.media.config();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cloud_name: media.cloud_name.clone(),
        signing_enabled: media.credentials.is_some(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
