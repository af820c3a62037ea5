use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framecut_api::config::ServerConfig;
use framecut_api::router::{allowed_origins, build_app_router};
use framecut_api::state::AppState;
use framecut_cloud::MediaClient;

const DEFAULT_LOG_FILTER: &str = "framecut_api=debug,framecut_cloud=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let origins = allowed_origins(&config).expect("CORS_ORIGINS contains an invalid origin");
    tracing::info!(
        host = %config.host,
        port = config.port,
        cors_origins = origins.len(),
        max_upload_bytes = config.max_upload_bytes,
        "Loaded server configuration"
    );
    tracing::info!(
        cloud_name = %config.media.cloud_name,
        upload_preset = %config.media.upload_preset,
        delivery_host = %config.media.delivery_host,
        signing = config.media.credentials.is_some(),
        "Media account configured"
    );

    let media = MediaClient::new(config.media.clone()).expect("Failed to build media client");
    let app = build_app_router(
        AppState {
            config: Arc::new(config.clone()),
            media,
        },
        &config,
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "framecut API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Open downloads drained, server stopped");
}

/// `RUST_LOG` if set, otherwise debug logging for our crates and tower-http.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl-C, or SIGTERM on Unix. `axum::serve` then stops
/// accepting connections and lets streaming downloads finish.
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, Ctrl-C only");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = sigterm => "SIGTERM",
    };

    tracing::info!(signal, "Shutting down, waiting for open downloads");
}
