use axum::extract::State;
use axum::Json;
use serde::Serialize;

use framecut_core::download::subclip_filename;
use framecut_core::transformation::EditRequest;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A processed rendition produced by the media service.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub url: String,
    pub filename: String,
}

/// POST /api/v1/exports
///
/// Run the edit as a signed, synchronous eager transformation and return
/// the processed URL. Returns 503 when API credentials are not configured.
pub async fn create_export(
    State(state): State<AppState>,
    Json(input): Json<EditRequest>,
) -> AppResult<Json<DataResponse<ExportResult>>> {
    let url = state.media.explicit_transform(&input).await?;
    tracing::info!(source_id = %input.source_id, url = %url, "Export ready");

    Ok(Json(DataResponse {
        data: ExportResult {
            url,
            filename: subclip_filename(input.trim_window()),
        },
    }))
}
