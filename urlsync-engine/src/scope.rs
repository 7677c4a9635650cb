//! Component lifecycle and the `use_sync_router` entry point.

use crate::engine::SyncRouter;
use crate::error::SyncResult;
use crate::host::SyncHost;
use crate::options::SyncOptions;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use urlsync_codec::TypeInfo;
use urlsync_types::ObservedState;

type Hook = Box<dyn FnOnce() + Send>;

/// Lifetime of the UI component that owns one or more sync routers.
///
/// Hooks registered with [`ComponentScope::on_before_unmount`] run once,
/// in registration order, when the scope unmounts or is dropped.
#[derive(Default)]
pub struct ComponentScope {
    hooks: Mutex<Vec<Hook>>,
    unmounted: AtomicBool,
}

impl ComponentScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teardown hook. On an unmounted scope the hook runs
    /// immediately.
    pub fn on_before_unmount<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_unmounted() {
            hook();
            return;
        }
        self.hooks.lock().unwrap().push(Box::new(hook));
    }

    pub fn unmount(&self) {
        if self.unmounted.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = std::mem::take(&mut *self.hooks.lock().unwrap());
        debug!("Unmounting component scope ({} hooks)", hooks.len());
        for hook in hooks {
            hook();
        }
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::SeqCst)
    }
}

impl Drop for ComponentScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ComponentScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentScope")
            .field("hooks", &self.hooks.lock().unwrap().len())
            .field("unmounted", &self.is_unmounted())
            .finish()
    }
}

/// Binds `state` to the location for the lifetime of `scope`.
///
/// Resolves the router accessors from `host`, starts a [`SyncRouter`] and
/// destroys it when the scope unmounts.
pub fn use_sync_router(
    scope: &ComponentScope,
    host: &SyncHost,
    state: ObservedState,
    type_info: TypeInfo,
    options: SyncOptions,
) -> SyncResult<()> {
    let accessors = host.accessors()?;
    let router = SyncRouter::new(state, type_info, options, accessors)?;
    scope.on_before_unmount(move || router.destroy());
    Ok(())
}
