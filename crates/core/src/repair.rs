//! Parsing and repair of previously issued delivery URLs.
//!
//! Older editor builds produced several non-canonical grammars: slash
//! separated parameters, trims placed before the overlay, the
//! `l_<id>/e_overlay` overlay form and URLs without the format group. The
//! repair path recovers the [`EditRequest`] such a URL encodes and renders it
//! again through the canonical builder.

use serde::Serialize;

use crate::error::CoreError;
use crate::transformation::{
    build_delivery_url, clean_public_id, normalize_border_id, DeliveryTarget, EditRequest, Stage,
    BORDER_PREFIX, DELIVERY_TYPE_UPLOAD, PARAM_SEPARATOR, RESOURCE_TYPE_VIDEO,
};

/// Parameter keys recognized as transformation components.
const TRANSFORMATION_KEYS: &[&str] = &[
    "a", "ac", "br", "c", "du", "e", "eo", "f", "fl", "g", "h", "l", "o", "q", "so", "vc", "w",
    "x", "y",
];

// ---------------------------------------------------------------------------
// Parsed URL
// ---------------------------------------------------------------------------

/// A delivery URL split into its structural parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeliveryUrl {
    pub target: DeliveryTarget,
    /// Transformation path components, each split on commas.
    pub components: Vec<Vec<String>>,
    /// Version component (`v1234`), if present.
    pub version: Option<String>,
    /// Public id including any folder path, extension removed.
    pub public_id: String,
    pub query: Option<String>,
}

impl ParsedDeliveryUrl {
    /// All transformation tokens in path order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.components.iter().flatten().map(String::as_str)
    }
}

fn is_version(component: &str) -> bool {
    component
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

fn is_transformation_token(token: &str) -> bool {
    token
        .split_once('_')
        .is_some_and(|(key, value)| !value.is_empty() && TRANSFORMATION_KEYS.contains(&key))
}

fn is_transformation_component(component: &str) -> bool {
    !component.is_empty() && component.split(PARAM_SEPARATOR).all(is_transformation_token)
}

/// Split a delivery URL into host, account, transformations and public id.
pub fn parse_delivery_url(url: &str) -> Result<ParsedDeliveryUrl, CoreError> {
    let url = url.trim();
    let marker = format!("/{RESOURCE_TYPE_VIDEO}/{DELIVERY_TYPE_UPLOAD}/");

    let (head, tail) = url.split_once(&marker).ok_or_else(|| {
        CoreError::Validation(format!("URL does not contain '{marker}': '{url}'"))
    })?;

    let (host, cloud_name) = head
        .rsplit_once('/')
        .filter(|(host, cloud)| host.contains("://") && !cloud.is_empty())
        .ok_or_else(|| {
            CoreError::Validation(format!("URL has no host/cloud name prefix: '{url}'"))
        })?;

    let tail = tail.split('#').next().unwrap_or(tail);
    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (tail, None),
    };

    let mut rest: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    if rest.is_empty() {
        return Err(CoreError::Validation(format!("URL has no public id: '{url}'")));
    }

    // The last component is always part of the public id.
    let mut components = Vec::new();
    let mut version = None;
    let mut consumed = 0;
    for component in &rest[..rest.len() - 1] {
        if version.is_none() && is_version(component) {
            version = Some(component.to_string());
        } else if version.is_none() && is_transformation_component(component) {
            components.push(
                component
                    .split(PARAM_SEPARATOR)
                    .map(str::to_string)
                    .collect(),
            );
        } else {
            break;
        }
        consumed += 1;
    }
    rest.drain(..consumed);

    let public_id = clean_public_id(&rest.join("/")).to_string();
    if public_id.is_empty() {
        return Err(CoreError::Validation(format!("URL has no public id: '{url}'")));
    }

    Ok(ParsedDeliveryUrl {
        target: DeliveryTarget::new(cloud_name).with_host(host),
        components,
        version,
        public_id,
        query,
    })
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// A problem found in a delivery URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RepairIssue {
    /// `e_overlay` was used instead of the relative layer group.
    LegacyOverlayEffect,
    /// The overlay was referenced as `l_<id>` instead of `l_image:<id>`.
    MissingImagePrefix,
    /// The border id lacked the `Border_` namespace.
    MissingBorderPrefix,
    /// Parameters were spread over several slash-separated components.
    SlashSeparated,
    /// Parameter groups were not in overlay, trim, format, attachment order.
    OutOfOrder,
    /// The `f_mp4,vc_h264` group was missing.
    MissingFormat,
    /// A trim offset could not be parsed.
    InvalidOffset(String),
    /// A parameter with no canonical equivalent was removed.
    DroppedParameter(String),
    /// The version component was removed.
    DroppedVersion(String),
    /// The query string (e.g. a stale signature) was removed.
    DroppedQuery,
}

/// Result of [`repair_delivery_url`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairOutcome {
    pub original_url: String,
    pub repaired_url: String,
    pub request: EditRequest,
    pub changed: bool,
    pub issues: Vec<RepairIssue>,
}

fn parse_offset(value: &str, token: &str, issues: &mut Vec<RepairIssue>) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => Some(seconds),
        _ => {
            issues.push(RepairIssue::InvalidOffset(token.to_string()));
            None
        }
    }
}

fn stage_of(token: &str) -> Option<Stage> {
    match token {
        "fl_relative" | "w_1.0" | "fl_layer_apply" | "e_overlay" => Some(Stage::Overlay),
        "f_mp4" | "vc_h264" => Some(Stage::Format),
        "fl_attachment" => Some(Stage::Attachment),
        t if t.starts_with("l_") => Some(Stage::Overlay),
        t if t.starts_with("so_") || t.starts_with("eo_") => Some(Stage::Trim),
        _ => None,
    }
}

/// Recover the edit request a delivery URL encodes and render it again
/// through the canonical builder, under the URL's own host and account.
pub fn repair_delivery_url(url: &str) -> Result<RepairOutcome, CoreError> {
    let parsed = parse_delivery_url(url)?;
    let mut issues = Vec::new();
    let mut request = EditRequest::new(parsed.public_id.clone());
    let mut has_format = false;

    for token in parsed.tokens() {
        match token {
            "fl_relative" | "w_1.0" | "fl_layer_apply" => {}
            "e_overlay" => issues.push(RepairIssue::LegacyOverlayEffect),
            "f_mp4" | "vc_h264" => has_format = true,
            "fl_attachment" => request.force_download = true,
            t if t.starts_with("l_image:") => {
                let id = &t["l_image:".len()..];
                if !id.starts_with(BORDER_PREFIX) {
                    issues.push(RepairIssue::MissingBorderPrefix);
                }
                request.border_id = Some(normalize_border_id(id));
            }
            t if t.starts_with("l_") => {
                let id = &t["l_".len()..];
                issues.push(RepairIssue::MissingImagePrefix);
                if !id.starts_with(BORDER_PREFIX) {
                    issues.push(RepairIssue::MissingBorderPrefix);
                }
                request.border_id = Some(normalize_border_id(id));
            }
            t if t.starts_with("so_") => {
                request.trim_start = parse_offset(&t["so_".len()..], t, &mut issues);
            }
            t if t.starts_with("eo_") => {
                request.trim_end = parse_offset(&t["eo_".len()..], t, &mut issues);
            }
            other => issues.push(RepairIssue::DroppedParameter(other.to_string())),
        }
    }

    if parsed.components.len() > 1 {
        issues.push(RepairIssue::SlashSeparated);
    }

    let stages: Vec<Stage> = parsed.tokens().filter_map(stage_of).collect();
    if stages.windows(2).any(|pair| pair[0] > pair[1]) {
        issues.push(RepairIssue::OutOfOrder);
    }

    if !has_format {
        issues.push(RepairIssue::MissingFormat);
    }
    if let Some(version) = &parsed.version {
        issues.push(RepairIssue::DroppedVersion(version.clone()));
    }
    if parsed.query.is_some() {
        issues.push(RepairIssue::DroppedQuery);
    }

    let repaired_url = build_delivery_url(&parsed.target, &request)?;
    let changed = repaired_url != url.trim();

    Ok(RepairOutcome {
        original_url: url.to_string(),
        repaired_url,
        request,
        changed,
        issues,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
