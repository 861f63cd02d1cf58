//! HTTP middleware

pub mod url_metrics;

pub use url_metrics::{
    RequestLabels, UrlMetrics, UrlMetricsLayer, UrlMetricsService, url_metrics_middleware,
};
