//! Router abstraction.
//!
//! The engine reads the current location through a [`RouteSource`] and
//! rewrites it through a [`Navigator`], so it works with any router that
//! can expose the two.

use crate::error::NavigationError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use urlsync_types::{Location, Query};

/// Read access to the current location.
pub trait RouteSource: Send + Sync {
    /// Returns the current location.
    fn current(&self) -> Location;

    /// Subscribes to location changes.
    fn watch(&self) -> watch::Receiver<Location>;
}

/// Where a replace navigation should lead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTarget {
    pub query: Query,
}

impl NavigationTarget {
    pub fn query(query: Query) -> Self {
        Self { query }
    }
}

/// Navigation mutator.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Replaces the current location. Must not add a history entry.
    async fn replace(&self, target: NavigationTarget) -> Result<(), NavigationError>;
}

/// The location accessor and navigator a sync router works against.
#[derive(Clone)]
pub struct RouterAccessors {
    pub route: Arc<dyn RouteSource>,
    pub router: Arc<dyn Navigator>,
}

impl RouterAccessors {
    pub fn new(route: Arc<dyn RouteSource>, router: Arc<dyn Navigator>) -> Self {
        Self { route, router }
    }
}

impl fmt::Debug for RouterAccessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterAccessors").finish_non_exhaustive()
    }
}
