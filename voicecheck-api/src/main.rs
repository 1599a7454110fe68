//! voicecheck-api - AI voice detection service
//!
//! Accepts a base64-encoded speech clip on `POST /detect` and answers with
//! an AI_GENERATED / HUMAN verdict, a confidence and an explanation.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voicecheck_api::config::{Args, ServiceConfig, TomlConfig};
use voicecheck_api::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::for_args(&args).context("Failed to load configuration file")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting voicecheck-api v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        info!("Config file: {}", path.display());
    }

    let config = ServiceConfig::resolve(&args, &toml_config).context("Invalid configuration")?;
    let analyzer = config
        .build_analyzer()
        .context("Failed to build detection pipeline")?;
    info!(
        "Rule set '{}' with {} rules",
        analyzer.rules().name,
        analyzer.rules().rules.len()
    );

    let state =
        AppState::new(analyzer, &config.api_key).with_max_body_bytes(config.max_body_bytes);
    let app = voicecheck_api::build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
