use framecut_core::signing::ApiCredentials;
use framecut_core::transformation::{DeliveryTarget, DEFAULT_DELIVERY_HOST};
use framecut_core::upload::DEFAULT_UPLOAD_PRESET;

/// Default base URL of the media service's admin/upload API.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Connection settings for one media service account.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Account ("cloud") name used in every URL.
    pub cloud_name: String,
    /// Unsigned upload preset sent with uploads.
    pub upload_preset: String,
    /// Delivery host, e.g. `https://res.cloudinary.com`.
    pub delivery_host: String,
    /// API base, e.g. `https://api.cloudinary.com`.
    pub api_base: String,
    /// Needed only for signed URLs and explicit transformations.
    pub credentials: Option<ApiCredentials>,
}

impl MediaConfig {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: DEFAULT_UPLOAD_PRESET.to_string(),
            delivery_host: DEFAULT_DELIVERY_HOST.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            credentials: None,
        }
    }

    pub fn delivery_target(&self) -> DeliveryTarget {
        DeliveryTarget::new(self.cloud_name.clone()).with_host(self.delivery_host.clone())
    }

    /// `{api_base}/v1_1/{cloud_name}/video/{action}`
    pub fn video_endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/video/{action}",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}
