use framecut_cloud::config::DEFAULT_API_BASE;
use framecut_cloud::MediaConfig;
use framecut_core::signing::ApiCredentials;
use framecut_core::transformation::DEFAULT_DELIVERY_HOST;
use framecut_core::upload::{megabytes, DEFAULT_MAX_UPLOAD_MB, DEFAULT_UPLOAD_PRESET};

/// Server configuration loaded from environment variables.
///
/// All fields except the media account name have defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted upload in bytes (default: 100 MB).
    pub max_upload_bytes: u64,
    /// Media service account settings.
    pub media: MediaConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `HOST`                 | `0.0.0.0`                    |
    /// | `PORT`                 | `3000`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                         |
    /// | `MAX_UPLOAD_MB`        | `100`                        |
    /// | `MEDIA_CLOUD_NAME`     | required                     |
    /// | `MEDIA_UPLOAD_PRESET`  | `video_borders`              |
    /// | `MEDIA_DELIVERY_HOST`  | `https://res.cloudinary.com` |
    /// | `MEDIA_API_BASE`       | `https://api.cloudinary.com` |
    /// | `MEDIA_API_KEY`        | unset                        |
    /// | `MEDIA_API_SECRET`     | unset                        |
    ///
    /// Signed URLs and exports are only available when both the API key and
    /// secret are set.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_mb: u64 = env_or("MAX_UPLOAD_MB", &DEFAULT_MAX_UPLOAD_MB.to_string())
            .parse()
            .expect("MAX_UPLOAD_MB must be a valid u64");

        let cloud_name = std::env::var("MEDIA_CLOUD_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .expect("MEDIA_CLOUD_NAME must be set");

        let credentials = match (
            std::env::var("MEDIA_API_KEY").ok().filter(|v| !v.is_empty()),
            std::env::var("MEDIA_API_SECRET").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(api_key), Some(api_secret)) => Some(ApiCredentials {
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let media = MediaConfig {
            cloud_name: cloud_name.trim().to_string(),
            upload_preset: env_or("MEDIA_UPLOAD_PRESET", DEFAULT_UPLOAD_PRESET),
            delivery_host: env_or("MEDIA_DELIVERY_HOST", DEFAULT_DELIVERY_HOST),
            api_base: env_or("MEDIA_API_BASE", DEFAULT_API_BASE),
            credentials,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes: megabytes(max_upload_mb),
            media,
        }
    }
}
