use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use framecut_core::upload::{validate_upload, UploadedVideo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Used when the client sends no filename with the file part.
const DEFAULT_UPLOAD_FILENAME: &str = "upload.mp4";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// POST /api/v1/uploads
///
/// Accept a multipart video upload (field `file`), validate it, and
/// forward it to the media service with the configured upload preset.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedVideo>>)> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_UPLOAD_FILENAME)
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    validate_upload(
        content_type.as_deref(),
        &filename,
        data.len() as u64,
        state.config.max_upload_bytes,
    )?;

    let uploaded = state.media.upload_video(filename, content_type, data).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: uploaded })))
}
