//! sandbox-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST endpoints and the WebSocket
//! event relay.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sandbox_gateway::app::build_app;
use sandbox_gateway::app_state::AppState;
use sandbox_gateway::config::{GatewayConfig, LogFormat};
use sandbox_gateway::service::{FireFlyClients, Upstream};
use sandbox_gateway::ws::{self, SocketRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        upstream = %config.upstream_endpoint,
        namespace = %config.default_namespace,
        "starting sandbox-gateway"
    );

    // Build service layer
    let clients = Arc::new(FireFlyClients::from_config(&config)?);
    let upstream: Arc<dyn Upstream> = clients.default_client().await;

    // Register relay endpoints, then freeze the registry
    let mut sockets = SocketRegistry::new();
    ws::register_relays(&mut sockets, &upstream)?;
    let sockets = Arc::new(sockets);

    // Build router
    let app = build_app(AppState::new(clients), sockets);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received terminate signal"),
    }
}
