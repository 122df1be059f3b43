//! Error types for resolution, history retrieval and rating

use thiserror::Error;

/// Errors raised by the radar core
#[derive(Debug, Error)]
pub enum RadarError {
    /// Every resolution strategy was tried without a match
    #[error("Not found: {0}")]
    NotFound(String),

    /// An empty price series reached the indicator calculator
    #[error("Invalid series for {0}: no price rows")]
    InvalidSeries(String),

    /// An external collaborator failed; the caller skips and retries next cycle
    #[error("Transient fetch failure from {source_name}: {reason}")]
    TransientFetch {
        source_name: String,
        reason: String,
    },

    /// An external call exceeded the configured timeout
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unparseable interactive command
    #[error("Command error: {0}")]
    Command(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl RadarError {
    /// Shorthand for a collaborator failure
    pub fn transient(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::TransientFetch {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure should only skip the current cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransientFetch { .. }
                | Self::Timeout(_)
                | Self::Network(_)
                | Self::Json(_)
                | Self::YahooFinance(_)
        )
    }
}

/// Result type alias for radar operations
pub type Result<T> = std::result::Result<T, RadarError>;

/// Convert anyhow::Error to RadarError
impl From<anyhow::Error> for RadarError {
    fn from(err: anyhow::Error) -> Self {
        RadarError::Other(err.to_string())
    }
}
