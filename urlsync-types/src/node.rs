//! The observed state tree.
//!
//! State is modeled as tagged nodes decided by shape rather than by
//! inspecting values at runtime:
//! - [`StateNode::Leaf`]: a scalar, or an opaque record that is never
//!   descended into
//! - [`StateNode::Array`]: a sequence, always treated as a single value
//! - [`StateNode::Object`]: plain data whose fields are addressable by
//!   key-path
//! - [`StateNode::Cell`]: a shared indirection holding another node
//!
//! Cells may be shared between several places in the tree, so every walk
//! tracks the cells visited along the current path and refuses to enter
//! one twice.

use crate::{KeyPath, Result, StateError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Maximum nesting depth accepted by any walk over the tree.
pub const MAX_DEPTH: usize = 64;

/// Fields of an object node, ordered by name.
pub type StateObject = BTreeMap<String, StateNode>;

/// One node of the observed state tree.
#[derive(Debug, Clone)]
pub enum StateNode {
    Leaf(Value),
    Array(Vec<Value>),
    Object(StateObject),
    Cell(StateCell),
}

impl StateNode {
    /// Wraps any value as a leaf, including records that would otherwise
    /// become object nodes.
    #[must_use]
    pub fn opaque(value: Value) -> Self {
        Self::Leaf(value)
    }

    /// Wraps a node in a fresh cell.
    #[must_use]
    pub fn cell(node: impl Into<StateNode>) -> Self {
        Self::Cell(StateCell::new(node))
    }

    /// Returns true for object nodes (cells are not unwrapped).
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Converts the node to a JSON value, unwrapping cells.
    pub fn to_value(&self) -> Result<Value> {
        let mut path = Vec::new();
        let mut visited = Vec::new();
        self.value_at(&mut path, &mut visited)
    }

    /// Follows cells until a non-cell node is reached and returns a copy
    /// of it.
    ///
    /// `visited` holds the ids of the cells already entered on the current
    /// path; every cell unwrapped here is appended to it. `path` is only
    /// used for error reporting.
    pub fn resolve(&self, visited: &mut Vec<usize>, path: &str) -> Result<StateNode> {
        let mut node = self.clone();
        while let StateNode::Cell(cell) = &node {
            enter_cell(cell, visited, path)?;
            let inner = cell.get();
            node = inner;
        }
        Ok(node)
    }

    fn value_at(&self, path: &mut Vec<String>, visited: &mut Vec<usize>) -> Result<Value> {
        if path.len() > MAX_DEPTH {
            return Err(StateError::DepthExceeded {
                path: path.join("."),
            });
        }
        match self {
            Self::Leaf(value) => Ok(value.clone()),
            Self::Array(items) => Ok(Value::Array(items.clone())),
            Self::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, child) in fields {
                    path.push(key.clone());
                    let value = child.value_at(path, visited);
                    path.pop();
                    map.insert(key.clone(), value?);
                }
                Ok(Value::Object(map))
            }
            Self::Cell(cell) => {
                enter_cell(cell, visited, &path.join("."))?;
                let inner = cell.get();
                let value = inner.value_at(path, visited);
                visited.pop();
                value
            }
        }
    }

    /// Same content, compared through cells.
    ///
    /// `visited` holds the cells locked by the caller; reaching one of
    /// them again is a cycle, never a second lock. A cyclic `other` is an
    /// error, a cyclic `self` only compares unequal.
    fn same_as(&self, other: &StateNode, visited: &[usize]) -> Result<bool> {
        let next = other.value_at(&mut Vec::new(), &mut visited.to_vec())?;
        let current = self.value_at(&mut Vec::new(), &mut visited.to_vec());
        Ok(matches!(current, Ok(current) if current == next))
    }
}

impl From<Value> for StateNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, StateNode::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items),
            other => Self::Leaf(other),
        }
    }
}

impl From<StateCell> for StateNode {
    fn from(cell: StateCell) -> Self {
        Self::Cell(cell)
    }
}

impl From<StateObject> for StateNode {
    fn from(fields: StateObject) -> Self {
        Self::Object(fields)
    }
}

/// A shared, mutable indirection inside the state tree.
///
/// Cloning a cell clones the handle; both clones see the same node.
#[derive(Clone)]
pub struct StateCell(Arc<Mutex<StateNode>>);

impl StateCell {
    pub fn new(node: impl Into<StateNode>) -> Self {
        Self(Arc::new(Mutex::new(node.into())))
    }

    /// Returns a copy of the held node.
    #[must_use]
    pub fn get(&self) -> StateNode {
        self.0.lock().unwrap().clone()
    }

    /// Replaces the held node.
    ///
    /// Writes made directly through a cell are not observed; go through
    /// [`crate::ObservedState::set`] to notify subscribers.
    pub fn set(&self, node: impl Into<StateNode>) {
        *self.0.lock().unwrap() = node.into();
    }

    /// Identity of the shared allocation.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &StateCell) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCell").field(&self.id()).finish()
    }
}

fn enter_cell(cell: &StateCell, visited: &mut Vec<usize>, path: &str) -> Result<()> {
    let id = cell.id();
    if visited.contains(&id) {
        return Err(StateError::CycleDetected {
            path: path.to_string(),
        });
    }
    if visited.len() > MAX_DEPTH {
        return Err(StateError::DepthExceeded {
            path: path.to_string(),
        });
    }
    visited.push(id);
    Ok(())
}

/// Reads the value at `path`, unwrapping cells along the way.
///
/// Returns `None` when a segment is missing or lands on a non-object.
pub(crate) fn get_in(root: &StateObject, path: &KeyPath) -> Result<Option<Value>> {
    let full = path.to_string();
    let mut visited = Vec::new();
    let Some((last, parents)) = path.segments().split_last() else {
        return Ok(None);
    };
    let mut current = StateNode::Object(root.clone());
    for segment in parents {
        let StateNode::Object(fields) = current.resolve(&mut visited, &full)? else {
            return Ok(None);
        };
        match fields.get(segment) {
            Some(child) => current = child.clone(),
            None => return Ok(None),
        }
    }
    let StateNode::Object(fields) = current.resolve(&mut visited, &full)? else {
        return Ok(None);
    };
    match fields.get(last) {
        Some(node) => {
            let resolved = node.resolve(&mut visited, &full)?;
            resolved.to_value().map(Some)
        }
        None => Ok(None),
    }
}

/// Assigns `value` at `path`, creating missing intermediate objects and
/// writing through cells. Returns whether anything changed.
pub(crate) fn assign_in(root: &mut StateObject, path: &KeyPath, value: StateNode) -> Result<bool> {
    let full = path.to_string();
    if path.is_empty() {
        return Err(StateError::Blocked { path: full });
    }
    let mut visited = Vec::new();
    assign_fields(root, path.segments(), value, &mut visited, &full)
}

fn assign_fields(
    fields: &mut StateObject,
    segments: &[String],
    value: StateNode,
    visited: &mut Vec<usize>,
    full: &str,
) -> Result<bool> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(StateError::Blocked {
            path: full.to_string(),
        });
    };
    if rest.is_empty() {
        return match fields.get_mut(head) {
            Some(slot) => write_slot(slot, value, visited, full),
            None => {
                fields.insert(head.clone(), value);
                Ok(true)
            }
        };
    }
    let child = fields
        .entry(head.clone())
        .or_insert_with(|| StateNode::Object(StateObject::new()));
    descend(child, rest, value, visited, full)
}

fn descend(
    node: &mut StateNode,
    rest: &[String],
    value: StateNode,
    visited: &mut Vec<usize>,
    full: &str,
) -> Result<bool> {
    match node {
        StateNode::Object(fields) => assign_fields(fields, rest, value, visited, full),
        StateNode::Cell(cell) => {
            let cell = cell.clone();
            enter_cell(&cell, visited, full)?;
            let mut inner = cell.0.lock().unwrap();
            let changed = descend(&mut inner, rest, value, visited, full);
            visited.pop();
            changed
        }
        StateNode::Leaf(_) | StateNode::Array(_) => Err(StateError::Blocked {
            path: full.to_string(),
        }),
    }
}

fn write_slot(
    slot: &mut StateNode,
    value: StateNode,
    visited: &mut Vec<usize>,
    full: &str,
) -> Result<bool> {
    if let StateNode::Cell(cell) = slot {
        let cell = cell.clone();
        enter_cell(&cell, visited, full)?;
        let mut inner = cell.0.lock().unwrap();
        let changed = write_slot(&mut inner, value, visited, full);
        visited.pop();
        return changed;
    }
    if slot.same_as(&value, visited)? {
        return Ok(false);
    }
    *slot = value;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_splits_objects_into_nodes() {
        let node = StateNode::from(json!({"a": {"b": 1}, "c": [1, 2]}));
        let StateNode::Object(fields) = node else {
            panic!("expected object node");
        };
        assert!(fields["a"].is_object());
        assert!(matches!(fields["c"], StateNode::Array(_)));
    }

    #[test]
    fn opaque_record_stays_a_leaf() {
        let node = StateNode::opaque(json!({"x": 1}));
        assert!(!node.is_object());
        assert_eq!(node.to_value().unwrap(), json!({"x": 1}));
    }

    #[test]
    fn self_referencing_cell_is_a_cycle() {
        let cell = StateCell::new(json!(null));
        let mut fields = StateObject::new();
        fields.insert("me".into(), StateNode::Cell(cell.clone()));
        cell.set(StateNode::Object(fields));

        let err = StateNode::Cell(cell.clone()).to_value().unwrap_err();
        assert!(matches!(err, StateError::CycleDetected { .. }));

        // Break the cycle so the allocation can be freed.
        cell.set(json!(null));
    }

    #[test]
    fn writing_over_a_held_cycle_replaces_it() {
        let cell = StateCell::new(json!(null));
        let mut fields = StateObject::new();
        fields.insert("me".into(), StateNode::Cell(cell.clone()));
        cell.set(StateNode::Object(fields));

        let mut slot = StateNode::Cell(cell.clone());
        let mut visited = Vec::new();
        let changed = write_slot(&mut slot, StateNode::from(json!(1)), &mut visited, "x").unwrap();
        assert!(changed);
        assert!(visited.is_empty());
        assert_eq!(cell.get().to_value().unwrap(), json!(1));
    }

    #[test]
    fn writing_a_held_cell_into_itself_is_a_cycle() {
        let cell = StateCell::new(json!(null));
        let mut slot = StateNode::Cell(cell.clone());
        let mut fields = StateObject::new();
        fields.insert("me".into(), StateNode::Cell(cell.clone()));

        let err = write_slot(&mut slot, StateNode::Object(fields), &mut Vec::new(), "x").unwrap_err();
        assert!(matches!(err, StateError::CycleDetected { .. }));
        assert_eq!(cell.get().to_value().unwrap(), json!(null));
    }

    #[test]
    fn the_same_cell_twice_side_by_side_is_fine() {
        let shared = StateCell::new(json!(3));
        let mut fields = StateObject::new();
        fields.insert("a".into(), StateNode::Cell(shared.clone()));
        fields.insert("b".into(), StateNode::Cell(shared));
        let value = StateNode::Object(fields).to_value().unwrap();
        assert_eq!(value, json!({"a": 3, "b": 3}));
    }

    #[test]
    fn cell_ids_follow_identity() {
        let a = StateCell::new(json!(1));
        let b = StateCell::new(json!(1));
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a.id(), b.id());
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
