//! Playback compatibility checks for delivery URLs.
//!
//! QuickTime (`.mov`) sources often carry codecs that browsers refuse to
//! play inline; asking the service for an MP4 rendition avoids that.

use serde::Serialize;

/// Marker identifying URLs served by the media service.
pub const DELIVERY_HOST_MARKER: &str = "cloudinary.com";

const UPLOAD_MARKER: &str = "/upload/";

/// Whether the URL already requests a specific or automatic format.
fn has_format_conversion(url: &str) -> bool {
    url.contains("f_mp4") || url.contains("f_auto")
}

/// Insert an `f_mp4` transformation right after `/upload/`.
///
/// URLs from other hosts, URLs that already request a format, and URLs
/// without exactly one `/upload/` marker are returned unchanged.
pub fn ensure_mp4(url: &str) -> String {
    if !url.contains(DELIVERY_HOST_MARKER) || has_format_conversion(url) {
        return url.to_string();
    }

    let mut parts = url.split(UPLOAD_MARKER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(head), Some(tail), None) => format!("{head}{UPLOAD_MARKER}f_mp4/{tail}"),
        _ => url.to_string(),
    }
}

/// Result of [`check_compatibility`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub is_mov: bool,
    pub needs_conversion: bool,
    pub recommended_url: String,
    pub notes: Vec<String>,
}

/// Inspect a video URL for likely codec compatibility problems.
pub fn check_compatibility(url: &str) -> CompatibilityReport {
    let is_mov = url.to_lowercase().contains(".mov");
    let mut notes = Vec::new();

    if is_mov {
        notes.push(".mov files may have codec compatibility issues in some browsers".to_string());
        notes.push("Consider using MP4 format for better compatibility".to_string());
    }

    let needs_conversion = is_mov && url.contains(DELIVERY_HOST_MARKER) && !url.contains("f_mp4");
    let recommended_url = if needs_conversion {
        notes.push("Service-side format conversion to MP4 recommended".to_string());
        ensure_mp4(url)
    } else {
        url.to_string()
    };

    CompatibilityReport {
        is_mov,
        needs_conversion,
        recommended_url,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOV_URL: &str = "https://res.cloudinary.com/demo/video/upload/v1/clip.mov";

    #[test]
    fn ensure_mp4_inserts_after_upload() {
        assert_eq!(
            ensure_mp4(MOV_URL),
            "https://res.cloudinary.com/demo/video/upload/f_mp4/v1/clip.mov"
        );
    }

    #[test]
    fn ensure_mp4_leaves_foreign_hosts() {
        let url = "https://example.com/video/upload/clip.mov";
        assert_eq!(ensure_mp4(url), url);
    }

    #[test]
    fn ensure_mp4_leaves_existing_format() {
        let url = "https://res.cloudinary.com/demo/video/upload/f_auto/clip.mov";
        assert_eq!(ensure_mp4(url), url);
    }

    #[test]
    fn ensure_mp4_needs_single_upload_marker() {
        let url = "https://res.cloudinary.com/demo/video/upload/x/upload/clip.mov";
        assert_eq!(ensure_mp4(url), url);
    }

    #[test]
    fn mov_on_service_needs_conversion() {
        let report = check_compatibility(MOV_URL);
        assert!(report.is_mov);
        assert!(report.needs_conversion);
        assert_eq!(report.notes.len(), 3);
        assert!(report.recommended_url.contains("/upload/f_mp4/"));
    }

    #[test]
    fn mp4_needs_nothing() {
        let url = "https://res.cloudinary.com/demo/video/upload/clip.mp4";
        let report = check_compatibility(url);
        assert!(!report.is_mov);
        assert!(!report.needs_conversion);
        assert!(report.notes.is_empty());
        assert_eq!(report.recommended_url, url);
    }

    #[test]
    fn foreign_mov_is_flagged_but_not_converted() {
        let report = check_compatibility("https://example.com/clip.MOV");
        assert!(report.is_mov);
        assert!(!report.needs_conversion);
        assert_eq!(report.notes.len(), 2);
    }
}
