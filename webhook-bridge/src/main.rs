//! Flowbridge Web Server - WhatsApp webhook receiver.
//!
//! This binary:
//! - Answers the WhatsApp webhook subscription handshake
//! - Replies to every inbound message with the onboarding Flow
//! - Always acknowledges inbound webhooks with 200 OK

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowbridge::{router, AppState, Config, GraphClient};

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

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        phone_number_id = %config.phone_number_id,
        graph_api_base_url = %config.graph_api_base_url,
        graph_api_version = %config.graph_api_version,
        graph_timeout_ms = config.graph_request_timeout.map(|t| t.as_millis() as u64),
        flow_id = %config.flow.flow_id,
        flow_cta = %config.flow.cta,
        mongo_uri_set = config.mongo_uri.is_some(),
        openai_key_set = config.openai_api_key.is_some(),
        "config_loaded"
    );

    let graph = GraphClient::new(&config).context("Failed to create Graph API client")?;
    info!(endpoint = %graph.messages_url(), "graph_client_created");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, graph));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
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
