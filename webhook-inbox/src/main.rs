//! Webhook inbox server.
//!
//! Receives signed webhook deliveries, records every delivery (valid or not)
//! in a bounded in-memory inbox and serves the inbox for inspection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webhook_inbox::web::{HEALTH_PATH, RECEIVED_PATH, RECEIVE_PATH, SIMULATE_PATH};
use webhook_inbox::{router, AppState, Config, HmacSha256Verifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        store_capacity = config.store_capacity,
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    let state = AppState::new(config.clone(), Arc::new(HmacSha256Verifier))
        .context("Failed to create webhook store")?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        address = %addr,
        receive = RECEIVE_PATH,
        received = RECEIVED_PATH,
        simulate = SIMULATE_PATH,
        health = HEALTH_PATH,
        "web_server_listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
