//! Error types for the suggestions API hooks handler.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for hook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while reading fixtures or talking to the runner.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture file exists but could not be read.
    #[error("failed to read fixture {path}: {source}")]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Handler configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration request to the mock server failed.
    #[error("configuration request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// The runner sent a message that does not follow the hooks protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for hook operations.
pub type Result<T> = std::result::Result<T, Error>;
