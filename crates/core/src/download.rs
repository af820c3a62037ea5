//! Filenames and response headers for rendered downloads.

use crate::transformation::{format_offset, TrimWindow, OUTPUT_EXTENSION};

/// Fallback when a filename sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "download.mp4";

/// Filename for a rendered subclip.
///
/// Convention: `subclip_{start}s_to_{end}s_duration_{duration}s.mp4`, with
/// every number at two decimals. Untrimmed renders are `subclip_full.mp4`.
///
/// ```
/// use framecut_core::download::subclip_filename;
/// use framecut_core::transformation::TrimWindow;
///
/// let trim = TrimWindow::new(1.5, 4.25);
/// assert_eq!(subclip_filename(trim), "subclip_1.50s_to_4.25s_duration_2.75s.mp4");
/// assert_eq!(subclip_filename(None), "subclip_full.mp4");
/// ```
pub fn subclip_filename(trim: Option<TrimWindow>) -> String {
    match trim {
        Some(trim) => format!(
            "subclip_{}s_to_{}s_duration_{}s.{OUTPUT_EXTENSION}",
            format_offset(trim.start()),
            format_offset(trim.end()),
            format_offset(trim.duration())
        ),
        None => format!("subclip_full.{OUTPUT_EXTENSION}"),
    }
}

/// Restrict a caller-supplied filename to `[A-Za-z0-9._-]` and force the
/// output extension.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return FALLBACK_FILENAME.to_string();
    }

    let suffix = format!(".{OUTPUT_EXTENSION}");
    if cleaned.to_lowercase().ends_with(&suffix) {
        cleaned.to_string()
    } else {
        format!("{cleaned}{suffix}")
    }
}

/// `Content-Disposition` value forcing a download under `filename`.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_filename(filename))
}
