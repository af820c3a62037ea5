//! Request signing for the media service.
//!
//! The service authenticates signed delivery URLs and admin API calls with a
//! SHA-1 digest over the alphabetically sorted `key=value` pairs joined by
//! `&`, followed directly by the API secret.

use std::collections::BTreeMap;

use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::error::CoreError;
use crate::transformation::{validate_request, DeliveryTarget, EditRequest, TransformationPlan};

/// API credentials for signed operations.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Compute the service signature over `params`.
///
/// Empty values are skipped, matching how the service builds the string to
/// sign on its side.
pub fn api_signature(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha1::digest(format!("{to_sign}{api_secret}").as_bytes());
    format!("{digest:x}")
}

/// Build a signed download URL for an edit request.
///
/// The attachment flag is always set. The signature covers the public id,
/// timestamp and the rendered transformation string.
pub fn sign_delivery_url(
    target: &DeliveryTarget,
    request: &EditRequest,
    credentials: &ApiCredentials,
    timestamp: i64,
) -> Result<String, CoreError> {
    let request = request.clone().with_force_download(true);
    let public_id = validate_request(&request)?;
    let plan = TransformationPlan::from_request(&request);

    let mut params = BTreeMap::new();
    params.insert("public_id", public_id.to_string());
    params.insert("timestamp", timestamp.to_string());
    params.insert("transformation", plan.to_string());

    let signature = api_signature(&params, &credentials.api_secret);
    let url = target.render(&plan, public_id);

    Ok(format!(
        "{url}?api_key={}&timestamp={timestamp}&signature={signature}",
        credentials.api_key
    ))
}

/// Signed form fields for the explicit (eager transformation) endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplicitParams {
    pub public_id: String,
    pub api_key: String,
    pub timestamp: String,
    pub resource_type: String,
    #[serde(rename = "type")]
    pub delivery_type: String,
    pub eager: String,
    pub eager_async: String,
    pub signature: String,
}

impl ExplicitParams {
    /// The fields as `(name, value)` pairs for a form body.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("public_id", self.public_id.clone()),
            ("api_key", self.api_key.clone()),
            ("timestamp", self.timestamp.clone()),
            ("resource_type", self.resource_type.clone()),
            ("type", self.delivery_type.clone()),
            ("eager", self.eager.clone()),
            ("eager_async", self.eager_async.clone()),
            ("signature", self.signature.clone()),
        ]
    }
}

/// Build the signed explicit-transformation request for an edit request.
///
/// The eager transformation is the canonical plan with the attachment flag,
/// processed synchronously so the result URL is available in the response.
pub fn explicit_params(
    request: &EditRequest,
    credentials: &ApiCredentials,
    timestamp: i64,
) -> Result<ExplicitParams, CoreError> {
    let request = request.clone().with_force_download(true);
    let public_id = validate_request(&request)?.to_string();
    let eager = TransformationPlan::from_request(&request).to_string();

    let mut params = BTreeMap::new();
    params.insert("eager", eager.clone());
    params.insert("eager_async", "false".to_string());
    params.insert("public_id", public_id.clone());
    params.insert("resource_type", "video".to_string());
    params.insert("timestamp", timestamp.to_string());
    params.insert("type", "upload".to_string());

    let signature = api_signature(&params, &credentials.api_secret);

    Ok(ExplicitParams {
        public_id,
        api_key: credentials.api_key.clone(),
        timestamp: timestamp.to_string(),
        resource_type: "video".to_string(),
        delivery_type: "upload".to_string(),
        eager,
        eager_async: "false".to_string(),
        signature,
    })
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
