//! Error types for label payload and script parsing.

use thiserror::Error;

/// Errors that can occur while reading or writing label data.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A command script line could not be parsed
    #[error("Invalid command on line {line}: {source}")]
    Script {
        /// 1-based line number
        line: usize,
        /// Underlying parse error
        source: serde_json::Error,
    },
}
