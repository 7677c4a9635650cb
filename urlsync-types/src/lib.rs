//! Core type definitions for urlsync.
//!
//! This crate defines the data shared by the codec and the sync engine:
//! - Query mappings as the router sees them (key → one or many strings)
//! - Locations (path + query) with percent-encoded parsing and formatting
//! - Dotted key-paths addressing fields of the observed state
//! - The observed state tree itself, modeled as tagged nodes
//!   (leaf | array | object | cell) with change notification
//!
//! Nothing here knows about type descriptors or debouncing; those belong
//! to `urlsync-codec` and `urlsync-engine`.

mod key_path;
mod node;
mod observed;
mod query;

pub use key_path::KeyPath;
pub use node::{StateCell, StateNode, StateObject, MAX_DEPTH};
pub use observed::ObservedState;
pub use query::{Location, Query, QueryValue};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors raised while walking or mutating the observed state tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A cell was reached twice along the same path.
    #[error("cycle detected at key path '{path}'")]
    CycleDetected { path: String },

    /// The tree is nested deeper than [`MAX_DEPTH`].
    #[error("state nested deeper than {MAX_DEPTH} levels at '{path}'")]
    DepthExceeded { path: String },

    /// An intermediate segment holds a value that is not an object.
    #[error("cannot assign through non-object value at '{path}'")]
    Blocked { path: String },

    /// The root of an observed state must be an object.
    #[error("observed state root must be an object")]
    NotAnObject,
}
