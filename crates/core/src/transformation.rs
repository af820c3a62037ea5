//! Canonical transformation-URL builder for the media delivery service.
//!
//! A delivery URL has the shape
//! `<host>/<cloud_name>/video/upload/<transformations>/<public_id>.mp4`.
//! The service interprets transformation parameters left to right, so the
//! order of the groups is part of the wire contract:
//!
//! 1. border overlay (`l_image:<id>`, `fl_relative`, `w_1.0`, `fl_layer_apply`)
//! 2. trim window (`so_<start>`, `eo_<end>`)
//! 3. output format and codec (`f_mp4`, `vc_h264`)
//! 4. attachment flag (`fl_attachment`)
//!
//! Every caller that needs a delivery URL goes through
//! [`TransformationPlan::from_request`] and [`build_delivery_url`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default delivery host of the media service.
pub const DEFAULT_DELIVERY_HOST: &str = "https://res.cloudinary.com";

/// Resource type path component for video assets.
pub const RESOURCE_TYPE_VIDEO: &str = "video";

/// Delivery type path component for uploaded assets.
pub const DELIVERY_TYPE_UPLOAD: &str = "upload";

/// Extension appended to every rendered public id.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Namespace prefix carried by every border overlay asset.
pub const BORDER_PREFIX: &str = "Border_";

/// Source extensions stripped from public ids before rendering.
pub const RECOGNIZED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm"];

/// Separator between parameters inside the transformation path component.
pub const PARAM_SEPARATOR: char = ',';

/// Characters that would end or split a transformation parameter when
/// placed inside a border asset id.
pub const FORBIDDEN_BORDER_CHARS: &[char] = &[',', '/', '?', '#', ':'];

/// Characters that would split the transformation component or start a
/// query or fragment when placed inside a public id. `/` stays legal as the
/// folder separator.
pub const FORBIDDEN_PUBLIC_ID_CHARS: &[char] = &[',', '?', '#'];

// ---------------------------------------------------------------------------
// Input sanitation
// ---------------------------------------------------------------------------

/// Strip a single trailing recognized video extension (case-insensitive).
///
/// ```
/// use framecut_core::transformation::clean_public_id;
///
/// assert_eq!(clean_public_id("clip123.mp4"), "clip123");
/// assert_eq!(clean_public_id("clip123.MOV"), "clip123");
/// assert_eq!(clean_public_id("clip123.mkv"), "clip123.mkv");
/// ```
pub fn clean_public_id(source_id: &str) -> &str {
    let source_id = source_id.trim();
    if let Some((stem, ext)) = source_id.rsplit_once('.') {
        if RECOGNIZED_VIDEO_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
        {
            return stem;
        }
    }
    source_id
}

/// Prefix a border asset id with [`BORDER_PREFIX`] unless it already has it.
pub fn normalize_border_id(border_id: &str) -> String {
    let border_id = border_id.trim();
    if border_id.starts_with(BORDER_PREFIX) {
        border_id.to_string()
    } else {
        format!("{BORDER_PREFIX}{border_id}")
    }
}

/// Serialize a second offset with exactly two decimal places.
///
/// The exact binary value is rounded to the nearest hundredth, so `0.015`
/// (stored as `0.01499..`) renders as `0.01`. A value lying exactly halfway
/// between two hundredths is only possible for odd multiples of `1/8`;
/// those round away from zero (`0.125` renders as `0.13`).
pub fn format_offset(seconds: f64) -> String {
    let eighths = seconds * 8.0;
    if eighths.fract() == 0.0 && (eighths % 2.0).abs() == 1.0 {
        let away = (seconds.abs() * 100.0).ceil() / 100.0;
        return format!("{:.2}", away.copysign(seconds));
    }
    format!("{seconds:.2}")
}

// ---------------------------------------------------------------------------
// Trim window
// ---------------------------------------------------------------------------

/// A validated `[start, end)` range in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    start: f64,
    end: f64,
}

impl TrimWindow {
    /// Returns `None` unless both bounds are finite, `start >= 0` and
    /// `end > start`. An unusable window means "no trim", never an error.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

// ---------------------------------------------------------------------------
// Edit request
// ---------------------------------------------------------------------------

/// A logical edit request assembled from the editor's current state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Opaque media identifier, possibly carrying a stray file extension.
    pub source_id: String,
    #[serde(default)]
    pub trim_start: Option<f64>,
    #[serde(default)]
    pub trim_end: Option<f64>,
    /// Border overlay asset; normalized to carry [`BORDER_PREFIX`].
    #[serde(default)]
    pub border_id: Option<String>,
    #[serde(default)]
    pub force_download: bool,
}

impl EditRequest {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    pub fn with_trim(mut self, start: f64, end: f64) -> Self {
        self.trim_start = Some(start);
        self.trim_end = Some(end);
        self
    }

    pub fn with_border(mut self, border_id: impl Into<String>) -> Self {
        self.border_id = Some(border_id.into());
        self
    }

    pub fn with_force_download(mut self, force_download: bool) -> Self {
        self.force_download = force_download;
        self
    }

    /// The trim window, if both bounds are present and form a valid range.
    pub fn trim_window(&self) -> Option<TrimWindow> {
        match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => TrimWindow::new(start, end),
            _ => None,
        }
    }

    /// The border asset id, ignoring blank values.
    fn border(&self) -> Option<&str> {
        self.border_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Transformations
// ---------------------------------------------------------------------------

/// Ordering group of a transformation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Overlay,
    Trim,
    Format,
    Attachment,
}

/// A single key-coded transformation parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// `l_image:<id>` -- reference the overlay asset.
    OverlayImage(String),
    /// `fl_relative` -- scale the overlay relative to the base video.
    RelativeScale,
    /// `w_1.0` -- overlay spans the full base width.
    FullWidth,
    /// `fl_layer_apply` -- composite the layer.
    LayerApply,
    /// `so_<seconds>`
    StartOffset(f64),
    /// `eo_<seconds>`
    EndOffset(f64),
    /// `f_mp4`
    FormatMp4,
    /// `vc_h264`
    CodecH264,
    /// `fl_attachment` -- force a download instead of inline playback.
    Attachment,
}

impl Transformation {
    pub fn stage(&self) -> Stage {
        match self {
            Self::OverlayImage(_) | Self::RelativeScale | Self::FullWidth | Self::LayerApply => {
                Stage::Overlay
            }
            Self::StartOffset(_) | Self::EndOffset(_) => Stage::Trim,
            Self::FormatMp4 | Self::CodecH264 => Stage::Format,
            Self::Attachment => Stage::Attachment,
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlayImage(id) => write!(f, "l_image:{id}"),
            Self::RelativeScale => f.write_str("fl_relative"),
            Self::FullWidth => f.write_str("w_1.0"),
            Self::LayerApply => f.write_str("fl_layer_apply"),
            Self::StartOffset(s) => write!(f, "so_{}", format_offset(*s)),
            Self::EndOffset(s) => write!(f, "eo_{}", format_offset(*s)),
            Self::FormatMp4 => f.write_str("f_mp4"),
            Self::CodecH264 => f.write_str("vc_h264"),
            Self::Attachment => f.write_str("fl_attachment"),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Ordered list of transformation parameters for one delivery URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformationPlan {
    steps: Vec<Transformation>,
}

impl TransformationPlan {
    /// Build the canonical plan for an edit request.
    pub fn from_request(request: &EditRequest) -> Self {
        let mut steps = Vec::with_capacity(9);

        if let Some(border) = request.border() {
            steps.push(Transformation::OverlayImage(normalize_border_id(border)));
            steps.push(Transformation::RelativeScale);
            steps.push(Transformation::FullWidth);
            steps.push(Transformation::LayerApply);
        }

        if let Some(trim) = request.trim_window() {
            steps.push(Transformation::StartOffset(trim.start()));
            steps.push(Transformation::EndOffset(trim.end()));
        }

        steps.push(Transformation::FormatMp4);
        steps.push(Transformation::CodecH264);

        if request.force_download {
            steps.push(Transformation::Attachment);
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[Transformation] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Rendered parameters, one string per step.
    pub fn segments(&self) -> Vec<String> {
        self.steps.iter().map(ToString::to_string).collect()
    }

    /// Whether the stages appear in overlay, trim, format, attachment order.
    pub fn is_canonically_ordered(&self) -> bool {
        self.steps
            .windows(2)
            .all(|pair| pair[0].stage() <= pair[1].stage())
    }
}

impl fmt::Display for TransformationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "{PARAM_SEPARATOR}")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Delivery target & rendering
// ---------------------------------------------------------------------------

/// Host and account under which delivery URLs are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTarget {
    pub host: String,
    pub cloud_name: String,
}

impl DeliveryTarget {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_DELIVERY_HOST.to_string(),
            cloud_name: cloud_name.into(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// `<host>/<cloud_name>/video/upload`
    pub fn upload_prefix(&self) -> String {
        format!(
            "{}/{}/{RESOURCE_TYPE_VIDEO}/{DELIVERY_TYPE_UPLOAD}",
            self.host.trim_end_matches('/'),
            self.cloud_name
        )
    }

    /// Render a plan against an already-cleaned public id.
    ///
    /// An empty plan omits the transformation component entirely.
    pub fn render(&self, plan: &TransformationPlan, public_id: &str) -> String {
        let prefix = self.upload_prefix();
        if plan.is_empty() {
            format!("{prefix}/{public_id}.{OUTPUT_EXTENSION}")
        } else {
            format!("{prefix}/{plan}/{public_id}.{OUTPUT_EXTENSION}")
        }
    }
}

/// Validate and clean the source id of a request.
pub fn require_public_id(request: &EditRequest) -> Result<&str, CoreError> {
    let public_id = clean_public_id(&request.source_id);
    if public_id.is_empty() {
        return Err(CoreError::Validation(
            "source_id must not be empty".to_string(),
        ));
    }
    if public_id.contains(FORBIDDEN_PUBLIC_ID_CHARS) {
        return Err(CoreError::Validation(format!(
            "source_id must not contain any of ',', '?', '#': '{public_id}'"
        )));
    }
    Ok(public_id)
}

/// Reject border ids that would inject parameters into the overlay group.
pub fn validate_border_id(request: &EditRequest) -> Result<(), CoreError> {
    match request.border() {
        Some(border) if border.contains(FORBIDDEN_BORDER_CHARS) => {
            Err(CoreError::Validation(format!(
                "border_id must not contain any of ',', '/', '?', '#', ':': '{border}'"
            )))
        }
        _ => Ok(()),
    }
}

/// Validate every caller-supplied id of a request, returning the cleaned
/// public id.
pub fn validate_request(request: &EditRequest) -> Result<&str, CoreError> {
    validate_border_id(request)?;
    require_public_id(request)
}

/// Build the delivery URL for an edit request.
///
/// Fails when the source id is empty or either id carries URL
/// metacharacters; every optional field degrades to "omit this group".
pub fn build_delivery_url(
    target: &DeliveryTarget,
    request: &EditRequest,
) -> Result<String, CoreError> {
    let public_id = validate_request(request)?;
    let plan = TransformationPlan::from_request(request);
    Ok(target.render(&plan, public_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
