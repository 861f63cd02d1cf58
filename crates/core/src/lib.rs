//! url-metrics-core: request path label normalization
//!
//! Pure building blocks shared by the middleware: the label sanitizer,
//! the middleware configuration and the error type.

pub mod config;
pub mod error;
pub mod label;

pub use config::{DEFAULT_METRIC_NAME, MetricsConfig, is_valid_metric_name};
pub use error::MetricsError;
pub use label::{normalize_path, sanitize_label, truncate_label};
