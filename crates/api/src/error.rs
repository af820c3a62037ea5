use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use framecut_cloud::MediaApiError;
use framecut_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`MediaApiError`] for failures
/// talking to the media service, and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `framecut_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A media service error from `framecut_cloud`.
    #[error(transparent)]
    Media(#[from] MediaApiError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured body limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a core error into an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::UnsupportedMedia(msg) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            msg.clone(),
        ),
        CoreError::PayloadTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            err.to_string(),
        ),
        CoreError::Internal(msg) => internal(msg),
    }
}

/// Classify a media service error.
///
/// Upstream failures map to 502 with the upstream status in the message;
/// the upstream body is logged, never echoed.
fn classify_media_error(err: &MediaApiError) -> (StatusCode, &'static str, String) {
    match err {
        MediaApiError::ApiError { status, body } => {
            tracing::warn!(upstream_status = status, body = %body, "Media service rejected request");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("Media service returned status {status}"),
            )
        }
        MediaApiError::Request(e) => {
            tracing::warn!(error = %e, "Media service unreachable");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Media service request failed".to_string(),
            )
        }
        MediaApiError::MissingEagerResult => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            err.to_string(),
        ),
        MediaApiError::NotConfigured(what) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_CONFIGURED",
            format!("Media service not configured: {what}"),
        ),
        MediaApiError::Core(core) => classify_core_error(core),
        MediaApiError::Io(e) => internal(&e.to_string()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Media(media) => classify_media_error(media),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
