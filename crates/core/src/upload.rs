//! Upload validation and the upload endpoint's response shape.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Content types accepted for upload.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["video/mp4", "video/webm", "video/quicktime"];

/// File extensions accepted when the browser sends no useful content type.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// Default upload size limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 100;

/// Default unsigned upload preset name.
pub const DEFAULT_UPLOAD_PRESET: &str = "video_borders";

const GENERIC_CONTENT_TYPES: &[&str] = &["", "application/octet-stream"];

/// Convert a megabyte limit into bytes.
pub fn megabytes(mb: u64) -> u64 {
    mb * 1024 * 1024
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an incoming video file before forwarding it.
///
/// The content type must be one of [`ACCEPTED_CONTENT_TYPES`]. Generic
/// content types fall back to the filename extension.
pub fn validate_upload(
    content_type: Option<&str>,
    filename: &str,
    size_bytes: u64,
    max_bytes: u64,
) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::PayloadTooLarge {
            size_bytes,
            limit_bytes: max_bytes,
        });
    }

    let content_type = content_type.unwrap_or("").trim().to_lowercase();
    if ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Ok(());
    }

    if GENERIC_CONTENT_TYPES.contains(&content_type.as_str()) {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(());
        }
    }

    Err(CoreError::UnsupportedMedia(format!(
        "Invalid file format '{content_type}' for '{filename}'. Please upload {}",
        ACCEPTED_CONTENT_TYPES.join(", ")
    )))
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

/// The subset of the upload endpoint's JSON response the editor relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedVideo {
    /// Durable identifier, used as `EditRequest::source_id`.
    pub public_id: String,
    /// Playable URL of the original upload.
    pub secure_url: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}
