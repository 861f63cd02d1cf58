use thiserror::Error;

/// Errors raised while configuring or registering the URL counter family
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Invalid metric name: {0:?}")]
    InvalidName(String),

    #[error("Metric already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::InvalidConfig(err.to_string())
    }
}
