//! Observed state: a shared state tree with change notification.

use crate::node::{assign_in, get_in};
use crate::{KeyPath, Result, StateError, StateNode, StateObject};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// A state tree owned by the caller and shared with the sync engine.
///
/// Every effective mutation bumps a version counter published on a
/// `watch` channel; subscribers see one notification per observed
/// version, not one per write. Assigning a value equal to the current
/// one is a no-op and does not notify.
///
/// Cloning yields another handle to the same tree.
#[derive(Clone)]
pub struct ObservedState {
    inner: Arc<Inner>,
}

struct Inner {
    root: Mutex<StateObject>,
    changes: watch::Sender<u64>,
}

impl ObservedState {
    pub fn new(root: StateObject) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                root: Mutex::new(root),
                changes,
            }),
        }
    }

    /// Builds the tree from a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match StateNode::from(value) {
            StateNode::Object(fields) => Ok(Self::new(fields)),
            _ => Err(StateError::NotAnObject),
        }
    }

    /// Builds the tree from named fields, typically cells.
    pub fn from_fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateNode)>,
    {
        Self::new(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Reads the value at `path`.
    pub fn get(&self, path: &KeyPath) -> Result<Option<Value>> {
        let root = self.inner.root.lock().unwrap();
        get_in(&root, path)
    }

    /// Assigns `value` at `path` and notifies subscribers if it changed.
    ///
    /// Missing intermediate objects are created; cells along the path are
    /// written through. Returns whether the tree changed.
    pub fn set(&self, path: &KeyPath, value: impl Into<StateNode>) -> Result<bool> {
        let changed = {
            let mut root = self.inner.root.lock().unwrap();
            assign_in(&mut root, path, value.into())?
        };
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    /// Mutates the tree directly. Always notifies.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut StateObject),
    {
        {
            let mut root = self.inner.root.lock().unwrap();
            mutate(&mut root);
        }
        self.notify();
    }

    /// Returns a copy of the root fields. Cells are shared, not copied.
    #[must_use]
    pub fn snapshot(&self) -> StateObject {
        self.inner.root.lock().unwrap().clone()
    }

    /// Converts the whole tree to JSON.
    pub fn to_json(&self) -> Result<Value> {
        StateNode::Object(self.snapshot()).to_value()
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.inner.changes.borrow()
    }

    /// Subscribes to changes. The current version is already marked seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }
}

impl fmt::Debug for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedState")
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}
