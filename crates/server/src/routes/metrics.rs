//! Scrape endpoint for the URL request counters
//!
//! Serves whatever the shared `MetricsRegistry` has recorded, including the
//! `<metric_name>{url, method, status}` family the middleware increments.

use axum::{Extension, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics - Render the registry's handle as Prometheus text exposition
pub async fn get(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
