//! REST client for the media service endpoints.
//!
//! Uploads, signed explicit transformations, delivery probes and
//! streaming downloads. Failures are returned to the caller as-is; nothing
//! here retries, since the service's transient-failure behaviour is not
//! ours to guess.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use framecut_core::error::CoreError;
use framecut_core::signing::{explicit_params, unix_timestamp};
use framecut_core::transformation::{DeliveryTarget, EditRequest};
use framecut_core::upload::UploadedVideo;

use crate::config::MediaConfig;

/// Timeout for establishing a connection to the service.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one media service account.
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    config: MediaConfig,
}

/// Errors from the media service client.
#[derive(Debug, thiserror::Error)]
pub enum MediaApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Media service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Writing a downloaded file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The explicit endpoint answered without an eager result.
    #[error("No eager transformation result returned")]
    MissingEagerResult,

    /// A setting required for this operation is absent.
    #[error("Media service not configured: {0}")]
    NotConfigured(&'static str),

    /// The request could not be built from the given input.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Outcome of probing a delivery URL.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub status: u16,
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
struct ExplicitResponse {
    #[serde(default)]
    eager: Vec<EagerResult>,
}

#[derive(Debug, Deserialize)]
struct EagerResult {
    secure_url: String,
}

impl MediaClient {
    /// Create a client with its own connection pool.
    pub fn new(config: MediaConfig) -> Result<Self, MediaApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn delivery_target(&self) -> DeliveryTarget {
        self.config.delivery_target()
    }

    /// Upload a video file with the configured unsigned preset.
    ///
    /// Sends a multipart `POST {api_base}/v1_1/{cloud}/video/upload` with
    /// `file`, `upload_preset` and `resource_type` fields.
    pub async fn upload_video(
        &self,
        file_name: String,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Result<UploadedVideo, MediaApiError> {
        let size = data.len();
        let mut part = reqwest::multipart::Part::bytes(data).file_name(file_name.clone());
        if let Some(content_type) = content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("resource_type", "video");

        tracing::info!(file_name = %file_name, size, "Uploading video to media service");

        let response = self
            .client
            .post(self.config.video_endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadedVideo = Self::parse_response(response).await?;
        tracing::info!(public_id = %uploaded.public_id, "Upload complete");
        Ok(uploaded)
    }

    /// Run the canonical transformation for `request` as a signed, synchronous
    /// eager transformation and return the processed URL.
    pub async fn explicit_transform(&self, request: &EditRequest) -> Result<String, MediaApiError> {
        let credentials = self
            .config
            .credentials
            .as_ref()
            .ok_or(MediaApiError::NotConfigured("API key and secret"))?;

        let params = explicit_params(request, credentials, unix_timestamp())?;
        tracing::info!(public_id = %params.public_id, eager = %params.eager, "Requesting explicit transformation");

        let response = self
            .client
            .post(self.config.video_endpoint("explicit"))
            .form(&params.form_fields())
            .send()
            .await?;

        let body: ExplicitResponse = Self::parse_response(response).await?;
        body.eager
            .into_iter()
            .next()
            .map(|eager| eager.secure_url)
            .ok_or(MediaApiError::MissingEagerResult)
    }

    /// Issue a `HEAD` request against a URL and report its status.
    ///
    /// Non-2xx statuses are a successful probe with `ok == false`.
    pub async fn probe(&self, url: &str) -> Result<ProbeResult, MediaApiError> {
        let response = self.client.head(url).send().await?;
        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "Probed delivery URL");
        Ok(ProbeResult {
            url: url.to_string(),
            status: status.as_u16(),
            ok: status.is_success(),
        })
    }

    /// Start a `GET` on a delivery URL, failing on a non-2xx status.
    ///
    /// The body is left unread so callers can stream it.
    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response, MediaApiError> {
        let response = self.client.get(url).send().await?;
        Self::ensure_success(response).await
    }

    /// Download a delivery URL into `path`, returning the bytes written.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64, MediaApiError> {
        let response = self.fetch(url).await?;
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(url, path = %path.display(), bytes = written, "Download complete");
        Ok(written)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or a
    /// [`MediaApiError::ApiError`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MediaApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Media service returned an error");
            return Err(MediaApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MediaApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
