pub mod downloads;
pub mod exports;
pub mod health;
pub mod uploads;
pub mod urls;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /urls                       build a delivery URL (POST)
/// /urls/signed                build a signed download URL (POST)
/// /urls/repair                rebuild a legacy or malformed URL (POST)
/// /urls/check                 HEAD one of our URLs, suggest a repair (POST)
/// /urls/compatibility         playback compatibility report (POST)
///
/// /uploads                    upload a source video (POST, multipart)
///
/// /exports                    run an explicit eager transformation (POST)
///
/// /downloads                  stream a rendered video as an attachment (GET)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/urls", urls::router())
        .nest("/uploads", uploads::router(config.max_upload_bytes))
        .nest("/exports", exports::router())
        .nest("/downloads", downloads::router())
}
