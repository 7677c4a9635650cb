//! Error types for the codec layer.

use thiserror::Error;
use urlsync_types::StateError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding query values or walking state.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An `object`-typed query value is not valid JSON.
    #[error("invalid JSON in query value: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The state tree could not be walked.
    #[error(transparent)]
    State(#[from] StateError),
}
