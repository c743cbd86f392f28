//! Error types for pulseboard-core

use thiserror::Error;

/// Main error type for the pulseboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Record source failure not covered by the variants above
    #[error("record source error: {0}")]
    Source(String),

    /// Team not found
    #[error("team not found: {0}")]
    TeamNotFound(String),
}

impl Error {
    /// Message safe to hand to dashboard clients.
    ///
    /// Only caller errors keep their detail; internal faults collapse to a
    /// generic message so paths, SQL and parser state stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::TeamNotFound(_) => "Team not found",
            Error::Config(_) => "Invalid configuration",
            _ => "Failed to compute metrics",
        }
    }

    /// Whether the error was caused by the caller rather than by a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TeamNotFound(_))
    }
}

/// Result type alias for pulseboard-core
pub type Result<T> = std::result::Result<T, Error>;
