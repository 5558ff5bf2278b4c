//! Error types for `flowchat` core library.

use thiserror::Error;

/// Result type alias using `flowchat` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `flowchat` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The flow response did not have the expected nesting.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Chat history could not be read or written
    #[error("History error: {0}")]
    History(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
