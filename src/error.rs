use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy shared by every component.
/// Component boundaries turn these into states or results; none of them are fatal.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The request never completed (DNS, connection reset, TLS, timeout).
    #[error("{0}")]
    NetworkFailure(String),

    /// A response arrived but did not have the expected shape.
    #[error("protocol mismatch (HTTP {status}): {detail}")]
    ProtocolMismatch { status: u16, detail: String },

    /// A measurement facility the component depends on is absent.
    #[error("{0} unavailable")]
    ResourceUnavailable(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WatchError {
    pub fn timeout(after: Duration) -> Self {
        WatchError::NetworkFailure(format!("request timed out after {}ms", after.as_millis()))
    }
}

impl From<reqwest::Error> for WatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return WatchError::NetworkFailure(format!("request timed out: {}", e));
        }
        WatchError::NetworkFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
