use axum::routing::post;
use axum::Router;

use crate::handlers::exports;
use crate::state::AppState;

/// Export routes.
///
/// ```text
/// POST   /                  -> create_export
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(exports::create_export))
}
