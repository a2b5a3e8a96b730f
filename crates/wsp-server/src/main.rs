//! Weather station platform server
//!
//! Loads configuration, connects to PostgreSQL and serves the HTTP API until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use wsp_api::AppState;
use wsp_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    wsp_obs::init("wspd", &config.log);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting weather station platform");

    let db = wsp_server::connect(&config.database).await?;
    let store = Arc::new(db.clone());

    let state = AppState::new(
        store.clone(),
        store,
        &wsp_server::auth_settings(&config.auth),
    )
    .context("Failed to initialize metrics exporter")?;
    let router = wsp_api::build_router(Arc::new(state));

    let listener = TcpListener::bind(config.http_bind())
        .await
        .with_context(|| format!("Failed to bind {}", config.http_bind()))?;

    wsp_api::serve(listener, router, shutdown_signal())
        .await
        .context("HTTP server error")?;

    db.close().await;
    info!("Weather station platform stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
