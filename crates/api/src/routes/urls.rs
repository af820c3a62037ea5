//! Route definitions for delivery URL building and maintenance.
//!
//! Mounted at `/urls` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::urls;
use crate::state::AppState;

/// Delivery URL routes.
///
/// ```text
/// POST   /                  -> build_url
/// POST   /signed            -> build_signed_url
/// POST   /repair            -> repair_url
/// POST   /check             -> check_url
/// POST   /compatibility     -> check_compatibility
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(urls::build_url))
        .route("/signed", post(urls::build_signed_url))
        .route("/repair", post(urls::repair_url))
        .route("/check", post(urls::check_url))
        .route("/compatibility", post(urls::check_compatibility))
}
