//! In-memory router.
//!
//! Keeps the current location in a watch channel and records history, so
//! applications without a browser (and tests) can drive a sync router.

use crate::error::NavigationError;
use crate::router::{NavigationTarget, Navigator, RouteSource, RouterAccessors};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;
use urlsync_types::{Location, Query};

/// A router whose location lives in memory.
#[derive(Debug)]
pub struct MemoryRouter {
    location: watch::Sender<Location>,
    history: Mutex<Vec<Location>>,
    replaces: AtomicUsize,
    fail_replace: AtomicBool,
}

impl MemoryRouter {
    pub fn new(initial: Location) -> Arc<Self> {
        let (location, _) = watch::channel(initial.clone());
        Arc::new(Self {
            location,
            history: Mutex::new(vec![initial]),
            replaces: AtomicUsize::new(0),
            fail_replace: AtomicBool::new(false),
        })
    }

    /// Parses `url` (`/path?query`) as the initial location.
    pub fn at(url: &str) -> Arc<Self> {
        Self::new(Location::parse(url))
    }

    /// Navigates to `query` on the current path, adding a history entry.
    pub fn push(&self, query: Query) {
        let mut next = self.location.borrow().clone();
        next.query = query;
        self.history.lock().unwrap().push(next.clone());
        self.location.send_replace(next);
    }

    /// Returns the current location.
    pub fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    /// Number of replace navigations received, failed ones included.
    pub fn replace_count(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    /// Number of history entries, the initial location included.
    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    /// Makes subsequent replace navigations fail.
    pub fn set_fail_replace(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    /// Accessors backed by this router.
    pub fn accessors(self: &Arc<Self>) -> RouterAccessors {
        RouterAccessors::new(Arc::clone(self) as Arc<dyn RouteSource>, Arc::clone(self) as Arc<dyn Navigator>)
    }
}

impl RouteSource for MemoryRouter {
    fn current(&self) -> Location {
        self.location()
    }

    fn watch(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}

#[async_trait]
impl Navigator for MemoryRouter {
    async fn replace(&self, target: NavigationTarget) -> Result<(), NavigationError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(NavigationError::new("navigation aborted"));
        }
        let changed = self.location.send_if_modified(|current| {
            if current.query == target.query {
                return false;
            }
            current.query = target.query;
            true
        });
        if changed {
            let current = self.location.borrow().clone();
            debug!("Replaced location with {current}");
            if let Some(last) = self.history.lock().unwrap().last_mut() {
                *last = current;
            }
        }
        Ok(())
    }
}
