//! Sync router: keeps observed state and the location query in step.
//!
//! Two subscriptions run from construction until [`SyncRouter::destroy`]:
//!
//! - **Location to state**: every route change decodes each query key that
//!   names a synchronized key-path and assigns it into the state.
//! - **State to location**: every state change (re)starts the debounce
//!   timer; when it fires, the state is flattened, encoded and merged over
//!   the current query, and the result is written with a replace
//!   navigation.
//!
//! Nothing suppresses the echo between the two. A decoded assignment that
//! equals the current value does not notify, and a write that would leave
//! the query unchanged issues no navigation, so a round settles after one
//! pass.

use crate::debounce::Debouncer;
use crate::error::{SyncError, SyncResult};
use crate::options::SyncOptions;
use crate::router::{NavigationTarget, RouterAccessors};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use urlsync_codec::{TypeInfo, ValueCodec, flatten, key_paths};
use urlsync_types::{KeyPath, ObservedState, Query};

/// Two-way binding between an [`ObservedState`] and the location query.
///
/// Dropping the router destroys it.
pub struct SyncRouter {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

struct Shared {
    state: ObservedState,
    type_info: TypeInfo,
    options: SyncOptions,
    codec: ValueCodec,
    key_paths: BTreeSet<String>,
    accessors: RouterAccessors,
    debouncer: Debouncer,
    destroyed: AtomicBool,
}

impl SyncRouter {
    /// Creates a router and starts both subscriptions.
    ///
    /// The current location is applied to the state before this returns;
    /// a decode failure there fails construction.
    pub fn new(
        state: ObservedState,
        type_info: TypeInfo,
        options: SyncOptions,
        accessors: RouterAccessors,
    ) -> SyncResult<Self> {
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let key_paths: BTreeSet<String> = key_paths(&type_info, &state.snapshot())?
            .into_iter()
            .filter(|path| !options.is_excluded(path))
            .collect();
        debug!("Synchronizing {} key-paths", key_paths.len());

        let shared = Arc::new(Shared {
            codec: ValueCodec::new(options.array_format.clone()),
            state,
            type_info,
            options,
            key_paths,
            accessors,
            debouncer: Debouncer::new(),
            destroyed: AtomicBool::new(false),
        });

        let mut route_rx = shared.accessors.route.watch();
        let initial = route_rx.borrow_and_update().query.clone();
        let changed = shared.apply_location(&initial)?;
        debug!("Applied initial location ({changed} changes)");

        // Subscribed after the initial apply so it does not echo back.
        let mut state_rx = shared.state.subscribe();

        let route_task = runtime.spawn({
            let shared = Arc::clone(&shared);
            async move {
                while route_rx.changed().await.is_ok() {
                    let query = route_rx.borrow_and_update().query.clone();
                    match shared.apply_location(&query) {
                        Ok(0) => {}
                        Ok(n) => debug!("Location applied to state ({n} changes)"),
                        Err(e) => error!("Failed to apply location to state: {e}"),
                    }
                }
            }
        });

        let state_task = runtime.spawn({
            let shared = Arc::clone(&shared);
            async move {
                while state_rx.changed().await.is_ok() {
                    let flush = Arc::clone(&shared);
                    shared.debouncer.schedule(shared.options.debounce(), async move {
                        if let Err(e) = flush.sync_now().await {
                            error!("Failed to write state to location: {e}");
                        }
                    });
                }
            }
        });

        info!("Sync router started");
        Ok(Self {
            shared,
            tasks: Mutex::new(vec![route_task, state_task]),
        })
    }

    /// Decodes the synchronized keys of `query` into the state.
    ///
    /// Returns how many assignments changed the state. The first decode or
    /// assignment error aborts and is returned.
    pub fn apply_location(&self, query: &Query) -> SyncResult<usize> {
        self.shared.apply_location(query)
    }

    /// Computes the query the current state maps to.
    pub fn encode_state(&self) -> SyncResult<Query> {
        self.shared.encode_state()
    }

    /// Writes the state to the location immediately, bypassing the
    /// debounce timer. No navigation happens when the query would not
    /// change; navigation failures are ignored.
    pub async fn sync_now(&self) -> SyncResult<()> {
        self.shared.sync_now().await
    }

    /// Stops both subscriptions and drops any pending write.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.shared.debouncer.cancel();
        info!("Sync router destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::SeqCst)
    }

    /// Returns the synchronized key-paths.
    pub fn key_paths(&self) -> &BTreeSet<String> {
        &self.shared.key_paths
    }

    pub fn options(&self) -> &SyncOptions {
        &self.shared.options
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.shared.type_info
    }

    /// Returns true while a state-to-location write is waiting on the
    /// debounce timer.
    pub fn has_pending_write(&self) -> bool {
        self.shared.debouncer.is_pending()
    }
}

impl Drop for SyncRouter {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SyncRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRouter")
            .field("key_paths", &self.shared.key_paths)
            .field("options", &self.shared.options)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl Shared {
    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn apply_location(&self, query: &Query) -> SyncResult<usize> {
        if self.is_destroyed() {
            return Ok(0);
        }
        let mut changed = 0;
        for (key, raw) in query {
            if !self.key_paths.contains(key) {
                continue;
            }
            let value = self.codec.decode(raw, self.type_info.get(key))?;
            if self.state.set(&KeyPath::parse(key), value)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn encode_state(&self) -> SyncResult<Query> {
        let data = flatten(&self.type_info, &self.state.snapshot())?;
        let current = self.accessors.route.current().query;

        let mut encoded = Query::new();
        for (path, value) in &data {
            if !self.key_paths.contains(path) {
                continue;
            }
            let raw = self.codec.encode(value, self.type_info.get(path));
            // An empty value only matters when it clears an existing entry.
            if raw.is_falsy() && !current.contains_key(path) {
                continue;
            }
            encoded.insert(path.as_str(), raw);
        }
        Ok(current.merge(encoded).without_empty())
    }

    async fn sync_now(&self) -> SyncResult<()> {
        if self.is_destroyed() {
            return Ok(());
        }
        let query = self.encode_state()?;
        if query == self.accessors.route.current().query {
            debug!("Location query already up to date");
            return Ok(());
        }
        debug!("Replacing location query: {query}");
        // A failed replace leaves the query stale; the state is untouched.
        let _ = self
            .accessors
            .router
            .replace(NavigationTarget::query(query))
            .await;
        Ok(())
    }
}
