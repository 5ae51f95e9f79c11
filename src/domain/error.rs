//! Error types for the chapel state layer.
//!
//! Stores convert expected failures (validation, storage, network) into
//! observable state instead of returning them, so [`ChapelError`] only crosses
//! the public API at construction time (loading configuration, content
//! indexes, storage files) and when parsing preference strings.

use thiserror::Error;

/// The main error type for chapel operations.
///
/// Most variants carry a description of what went wrong. I/O failures convert
/// automatically through `#[from]`.
///
/// # Examples
///
/// ```
/// use chapel::ChapelError;
///
/// fn load_catalogue() -> Result<(), ChapelError> {
///     Err(ChapelError::Content("missing English title".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum ChapelError {
    /// A durable key-value operation failed.
    ///
    /// Raised by storage backends; stores catch it and degrade to in-memory
    /// behaviour.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding persisted state or payloads failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form submission could not reach the endpoint, or the endpoint
    /// answered with a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// A string did not name a member of a preference enum.
    ///
    /// This is a caller contract violation, not a recoverable condition.
    #[error("Invalid {kind} preference: {value:?}")]
    InvalidPreference {
        /// Which preference was being parsed (`language`, `theme`, ...).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A content index entry or translation catalogue is malformed.
    #[error("Content error: {0}")]
    Content(String),
}

impl From<serde_json::Error> for ChapelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A specialized `Result` type for chapel operations.
pub type Result<T> = std::result::Result<T, ChapelError>;
