//! url-metrics-server library crate
//!
//! Exposes the URL metrics middleware, the registry it records into, and
//! `build_app` for integration tests. The binary entrypoint is in `main.rs`.

pub mod config;
pub mod middleware;
pub mod registry;
mod routes;

use axum::{Extension, Router, http::StatusCode, middleware as axum_mw, routing::get};
use tower_http::trace::TraceLayer;
use url_metrics_core::MetricsError;

use config::Config;
pub use middleware::{UrlMetrics, UrlMetricsLayer, url_metrics_middleware};
pub use registry::{CounterBinding, MetricsRegistry, UrlCounter};

/// Build the host application: `/health`, `/metrics` and a 404 fallback, all
/// counted by the URL metrics middleware.
///
/// Registration happens here, so a duplicate or invalid metric name fails
/// before the server starts accepting requests.
pub fn build_app(config: &Config, registry: &MetricsRegistry) -> Result<Router, MetricsError> {
    let url_metrics = UrlMetrics::new(&config.metrics, registry)?;

    let app = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(Extension(registry.handle()))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn_with_state(url_metrics, url_metrics_middleware));

    Ok(app)
}
