//! Error types for the sync layer.

use thiserror::Error;
use urlsync_codec::CodecError;
use urlsync_types::StateError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while wiring up or running a sync router.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No location/navigation accessors were registered and the host
    /// supplies no default pair.
    #[error("sync router is not initialized: register route and router accessors before first use")]
    NotInitialized,

    /// The engine was created outside a Tokio runtime.
    #[error("sync router requires a running Tokio runtime")]
    NoRuntime,

    /// A query value could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The observed state rejected a read or write.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Options could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failure reported by a [`crate::Navigator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("navigation failed: {reason}")]
pub struct NavigationError {
    pub reason: String,
}

impl NavigationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
