//! Accessor registration.

use crate::error::{SyncError, SyncResult};
use crate::router::RouterAccessors;
use std::sync::Mutex;
use tracing::debug;

/// Supplies router accessors to every sync router created for one host
/// application.
///
/// Accessors registered through [`SyncHost::init`] win. Otherwise the
/// host's built-in pair is used when it has one; a host without defaults
/// must be initialized before first use.
#[derive(Debug, Default)]
pub struct SyncHost {
    registered: Mutex<Option<RouterAccessors>>,
    defaults: Option<RouterAccessors>,
}

impl SyncHost {
    /// A host that ships no default accessors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose framework supplies a default accessor pair.
    pub fn with_defaults(defaults: RouterAccessors) -> Self {
        Self {
            registered: Mutex::new(None),
            defaults: Some(defaults),
        }
    }

    /// Registers the accessors, replacing any earlier registration.
    pub fn init(&self, accessors: RouterAccessors) {
        debug!("Registered router accessors");
        *self.registered.lock().unwrap() = Some(accessors);
    }

    /// Returns whether accessors were registered explicitly.
    pub fn is_initialized(&self) -> bool {
        self.registered.lock().unwrap().is_some()
    }

    /// Resolves the accessors to use.
    pub fn accessors(&self) -> SyncResult<RouterAccessors> {
        if let Some(accessors) = self.registered.lock().unwrap().as_ref() {
            return Ok(accessors.clone());
        }
        self.defaults.clone().ok_or(SyncError::NotInitialized)
    }
}
