//! Middleware configuration

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// Metric name used when none is configured
pub const DEFAULT_METRIC_NAME: &str = "traefik_url_requests_total";

/// URL metrics middleware configuration.
///
/// Deserializes from the plugin-style JSON shape:
/// `{"metricName": "...", "maxLabelLength": 128}`. Missing keys fall back
/// to [`MetricsConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    /// Name the counter family is registered under
    pub metric_name: String,
    /// Hard cap on the `url` label length in bytes. `None` means uncapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_label_length: Option<usize>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            max_label_length: None,
        }
    }
}

impl MetricsConfig {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_label_length(mut self, max: usize) -> Self {
        self.max_label_length = Some(max);
        self
    }

    /// Parse the plugin JSON configuration
    pub fn from_json(json: &str) -> Result<Self, MetricsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from `METRIC_NAME` and `MAX_LABEL_LENGTH`
    pub fn from_env() -> Result<Self, MetricsError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MetricsError> {
        let metric_name = lookup("METRIC_NAME").unwrap_or_else(|| DEFAULT_METRIC_NAME.into());

        let max_label_length = match lookup("MAX_LABEL_LENGTH") {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                MetricsError::InvalidConfig(format!("MAX_LABEL_LENGTH={raw:?}: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            metric_name,
            max_label_length,
        })
    }
}

/// Prometheus metric name rule: `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
