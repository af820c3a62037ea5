//! Route definitions for source video uploads.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Upload routes.
///
/// ```text
/// POST   /                  -> upload_video (multipart, field "file")
/// ```
///
/// The body limit sits just above `max_upload_bytes`; the handler reports
/// the exact size error for files in between.
pub fn router(max_upload_bytes: u64) -> Router<AppState> {
    let limit = usize::try_from(max_upload_bytes + MULTIPART_OVERHEAD_BYTES).unwrap_or(usize::MAX);

    Router::new()
        .route("/", post(uploads::upload_video))
        .layer(DefaultBodyLimit::max(limit))
}
