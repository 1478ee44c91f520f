//! HTTP server lifecycle

use crate::api::{build_app, AppState};
use crate::config::RagRelayConfig;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Bind and serve the application until a shutdown signal arrives
pub async fn run(config: &RagRelayConfig, state: AppState) -> Result<()> {
    let app = build_app(state, &config.server.cors_origins).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("RagRelay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C signal");
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM signal");
        }
    }
    info!("Starting graceful shutdown...");
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // No SIGTERM off Unix; Ctrl+C covers shutdown
    std::future::pending::<()>().await
}
