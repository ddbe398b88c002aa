//! Error types for mkgraph.

use thiserror::Error;

/// Result type alias using mkgraph's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mkgraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction call to an LLM backend failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Configuration error (missing API key, unknown provider, bad file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Run state could not be loaded or saved
    #[error("State error: {0}")]
    State(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
