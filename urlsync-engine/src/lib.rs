//! Two-way sync between observed state and the location query string.
//!
//! # Architecture
//!
//! A [`SyncRouter`] binds an [`ObservedState`](urlsync_types::ObservedState)
//! to a router through two subscriptions:
//!
//! 1. **Location to state**: query keys naming a synchronized key-path are
//!    decoded with their type descriptor and assigned into the state.
//! 2. **State to location**: state changes are debounced (trailing edge),
//!    then the flattened state is encoded and merged over the current query
//!    with a replace navigation.
//!
//! ## Components
//!
//! - **Router**: [`RouteSource`] and [`Navigator`], the two capabilities the
//!   engine needs from a router
//! - **Host**: [`SyncHost`] resolves which accessors a router uses
//! - **Scope**: [`ComponentScope`] and [`use_sync_router`] tie a router to
//!   the lifetime of the component that owns it
//! - **Memory router**: [`MemoryRouter`], an in-process router
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use urlsync_codec::{PrimitiveKind, TypeInfo};
//! use urlsync_engine::{MemoryRouter, SyncOptions, SyncRouter};
//! use urlsync_types::{KeyPath, ObservedState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = MemoryRouter::at("/list?page=3");
//! let state = ObservedState::from_json(json!({"page": 1, "q": ""}))?;
//! let info = TypeInfo::new().with("page", PrimitiveKind::Number);
//!
//! let sync = SyncRouter::new(state.clone(), info, SyncOptions::default(), router.accessors())?;
//! assert_eq!(state.get(&KeyPath::parse("page"))?, Some(json!(3)));
//!
//! state.set(&KeyPath::parse("q"), json!("shoes"))?;
//! sync.sync_now().await?;
//! assert_eq!(router.location().to_string(), "/list?page=3&q=shoes");
//! # Ok(())
//! # }
//! ```

mod debounce;
mod engine;
mod error;
mod host;
mod memory;
mod options;
mod router;
mod scope;

pub use debounce::Debouncer;
pub use engine::SyncRouter;
pub use error::{NavigationError, SyncError, SyncResult};
pub use host::SyncHost;
pub use memory::MemoryRouter;
pub use options::{DEFAULT_DEBOUNCE_MS, LEGACY_DEBOUNCE_MS, SyncOptions};
pub use router::{NavigationTarget, Navigator, RouteSource, RouterAccessors};
pub use scope::{ComponentScope, use_sync_router};
