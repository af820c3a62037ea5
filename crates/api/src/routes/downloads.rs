use axum::routing::get;
use axum::Router;

use crate::handlers::downloads;
use crate::state::AppState;

/// Download proxy routes.
///
/// ```text
/// GET    /?source_id=..&trim_start=..&trim_end=..&border_id=..&filename=..
///                           -> download_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(downloads::download_video))
}
