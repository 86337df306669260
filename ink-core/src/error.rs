//! Error types for ink input operations.

use thiserror::Error;

/// Result type for ink input operations.
pub type InkResult<T> = Result<T, InkError>;

/// Errors that can occur in ink input operations.
///
/// Per-contact rejections during normalization (unclassifiable tool, disallowed
/// pan) are not errors: they are reported as "not consumed". These variants
/// cover malformed input and session persistence only.
#[derive(Debug, Error)]
pub enum InkError {
    /// A raw contact frame is structurally invalid.
    #[error("Invalid contact frame: {0}")]
    InvalidFrame(String),

    /// An input mode name or code was not recognized.
    #[error("Unknown input mode: {0}")]
    UnknownInputMode(String),

    /// Session state serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
