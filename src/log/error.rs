//! Durable log error types.

use thiserror::Error;

/// Errors that can occur while appending to or reading the durable log.
#[derive(Debug, Error)]
pub enum LogError {
    /// Reading or writing the backing store failed
    #[error("log io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized or parsed back
    #[error("log record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
