//! Download proxy for rendered videos.
//!
//! Browsers ignore the `download` attribute on cross-origin links, so the
//! rendered file is streamed through this server with a
//! `Content-Disposition: attachment` header instead.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use framecut_core::download::{content_disposition, subclip_filename};
use framecut_core::transformation::{build_delivery_url, EditRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const VIDEO_MP4: &str = "video/mp4";

/// Query parameters for `GET /downloads`.
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub source_id: String,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
    pub border_id: Option<String>,
    /// Overrides the generated subclip filename.
    pub filename: Option<String>,
}

impl DownloadParams {
    fn edit_request(&self) -> EditRequest {
        EditRequest {
            source_id: self.source_id.clone(),
            trim_start: self.trim_start,
            trim_end: self.trim_end,
            border_id: self.border_id.clone(),
            force_download: true,
        }
    }
}

/// GET /api/v1/downloads
///
/// Build the delivery URL for the edit, fetch it, and stream the body back
/// as an attachment. Upstream failures surface as 502.
pub async fn download_video(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> AppResult<Response> {
    let request = params.edit_request();
    let url = build_delivery_url(&state.media.delivery_target(), &request)?;

    let filename = match params.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => subclip_filename(request.trim_window()),
    };

    tracing::info!(url = %url, filename = %filename, "Proxying download");
    let upstream = state.media.fetch(&url).await?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(VIDEO_MP4));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&filename))
            .map_err(|e| AppError::InternalError(e.to_string()))?,
    );
    if let Some(len) = upstream.content_length() {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    }

    Ok((headers, Body::from_stream(upstream.bytes_stream())).into_response())
}
