//! url-metrics-server: binary entrypoint.
//!
//! Hosts the URL metrics middleware in front of `/health`, `/metrics` and a
//! 404 fallback. The counter family is registered before the listener binds,
//! so a bad `METRIC_NAME` stops the process at startup.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use url_metrics_server::{MetricsRegistry, config::Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Invalid configuration");

    tracing::info!(
        metric = %config.metrics.metric_name,
        max_label_length = ?config.metrics.max_label_length,
        "URL metrics configured"
    );

    // Build application; registers the counter family
    let registry = MetricsRegistry::new();
    let app = url_metrics_server::build_app(&config, &registry)
        .expect("Failed to register URL metrics");

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Resolves on SIGINT or SIGTERM so in-flight requests are still counted
async fn shutdown_signal() {
    use tokio::signal;

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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
