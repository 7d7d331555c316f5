//! Error types for StackPlot

use thiserror::Error;

/// StackPlot error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or cross-section table error; fatal for setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source file or named histogram missing; non-fatal, skipped per source
    #[error("Data not found: {0}")]
    DataNotFound(String),

    /// Operation not allowed in the current session/panel state
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Malformed histogram or mismatched binning
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
