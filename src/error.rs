//! Error types for the gallery gate.

use thiserror::Error;

/// Main error type for gate operations.
///
/// Expected-bad user input never produces one of these; validators and the
/// rate limiter return values instead. These cover the infrastructure around
/// them: configuration loading and the record store.
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON encoding or decoding of stored records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for GateError {
    fn from(err: config::ConfigError) -> Self {
        GateError::Config(err.to_string())
    }
}

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
