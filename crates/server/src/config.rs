//! Server configuration

use url_metrics_core::{MetricsConfig, MetricsError};

/// Address the host binds when `BIND_ADDRESS` is unset
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from `BIND_ADDRESS` plus the metrics variables
    pub fn from_env() -> Result<Self, MetricsError> {
        Ok(Self {
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.into()),
            metrics: MetricsConfig::from_env()?,
        })
    }
}
