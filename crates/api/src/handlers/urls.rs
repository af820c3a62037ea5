//! Handlers for building, signing, repairing and checking delivery URLs.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use framecut_cloud::MediaApiError;
use framecut_core::compatibility::{self, CompatibilityReport};
use framecut_core::download::subclip_filename;
use framecut_core::error::CoreError;
use framecut_core::repair::{parse_delivery_url, repair_delivery_url, RepairOutcome};
use framecut_core::signing::{sign_delivery_url, unix_timestamp};
use framecut_core::transformation::{
    build_delivery_url, require_public_id, EditRequest, TransformationPlan,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for endpoints that take an existing URL.
#[derive(Debug, Deserialize)]
pub struct UrlInput {
    pub url: String,
}

/// A freshly built delivery URL and the pieces it was built from.
#[derive(Debug, Serialize)]
pub struct BuiltUrl {
    pub url: String,
    pub public_id: String,
    /// Transformation parameters in emission order.
    pub segments: Vec<String>,
    /// Suggested download filename for this render.
    pub filename: String,
}

/// A signed download URL.
#[derive(Debug, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub timestamp: i64,
}

/// Result of probing a delivery URL.
#[derive(Debug, Serialize)]
pub struct UrlCheck {
    pub url: String,
    pub status: u16,
    pub ok: bool,
    /// Canonical rebuild of a failing URL, when one differs from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair: Option<RepairOutcome>,
}

fn require_url(input: &UrlInput) -> AppResult<&str> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(CoreError::Validation("url must not be empty".to_string()).into());
    }
    Ok(url)
}

/// Accept only delivery URLs under the configured host and account.
///
/// The server never issues requests to a host the client picked.
fn require_own_delivery_url<'a>(state: &AppState, url: &'a str) -> AppResult<&'a str> {
    let parsed = parse_delivery_url(url)?;
    let own = state.media.delivery_target();

    let same_host = parsed.target.host.trim_end_matches('/') == own.host.trim_end_matches('/');
    if !same_host || parsed.target.cloud_name != own.cloud_name {
        return Err(CoreError::Validation(format!(
            "Only URLs under '{}' can be checked",
            own.upload_prefix()
        ))
        .into());
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/urls
///
/// Build the canonical delivery URL for an edit request.
pub async fn build_url(
    State(state): State<AppState>,
    Json(input): Json<EditRequest>,
) -> AppResult<Json<DataResponse<BuiltUrl>>> {
    let target = state.media.delivery_target();
    let url = build_delivery_url(&target, &input)?;
    let public_id = require_public_id(&input)?.to_string();
    let segments = TransformationPlan::from_request(&input).segments();

    tracing::debug!(public_id = %public_id, url = %url, "Built delivery URL");

    Ok(Json(DataResponse {
        data: BuiltUrl {
            url,
            public_id,
            segments,
            filename: subclip_filename(input.trim_window()),
        },
    }))
}

/// POST /api/v1/urls/signed
///
/// Build a signed download URL. Requires API credentials; returns 503
/// without them.
pub async fn build_signed_url(
    State(state): State<AppState>,
    Json(input): Json<EditRequest>,
) -> AppResult<Json<DataResponse<SignedUrl>>> {
    let credentials = state
        .media
        .config()
        .credentials
        .as_ref()
        .ok_or(MediaApiError::NotConfigured("API key and secret"))?;

    let timestamp = unix_timestamp();
    let url = sign_delivery_url(&state.media.delivery_target(), &input, credentials, timestamp)?;

    tracing::info!(source_id = %input.source_id, timestamp, "Signed delivery URL");

    Ok(Json(DataResponse {
        data: SignedUrl { url, timestamp },
    }))
}

/// POST /api/v1/urls/repair
///
/// Rebuild a legacy or malformed delivery URL in canonical form.
pub async fn repair_url(Json(input): Json<UrlInput>) -> AppResult<Json<DataResponse<RepairOutcome>>> {
    let outcome = repair_delivery_url(require_url(&input)?)?;

    if outcome.changed {
        tracing::info!(
            original = %outcome.original_url,
            repaired = %outcome.repaired_url,
            issues = outcome.issues.len(),
            "Repaired delivery URL"
        );
    }

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/urls/check
///
/// Send `HEAD` to one of our own delivery URLs. A failing URL comes back
/// with its canonical rebuild attached when that differs from it. Foreign
/// hosts and accounts are rejected with 400 before any request is made.
pub async fn check_url(
    State(state): State<AppState>,
    Json(input): Json<UrlInput>,
) -> AppResult<Json<DataResponse<UrlCheck>>> {
    let url = require_own_delivery_url(&state, require_url(&input)?)?;
    let probe = state.media.probe(url).await?;

    let repair = if probe.ok {
        None
    } else {
        match repair_delivery_url(url) {
            Ok(outcome) if outcome.changed => Some(outcome),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(url, error = %e, "Failing URL could not be rebuilt");
                None
            }
        }
    };

    Ok(Json(DataResponse {
        data: UrlCheck {
            url: probe.url,
            status: probe.status,
            ok: probe.ok,
            repair,
        },
    }))
}

/// POST /api/v1/urls/compatibility
pub async fn check_compatibility(
    Json(input): Json<UrlInput>,
) -> AppResult<Json<DataResponse<CompatibilityReport>>> {
    let report = compatibility::check_compatibility(require_url(&input)?);
    Ok(Json(DataResponse { data: report }))
}
