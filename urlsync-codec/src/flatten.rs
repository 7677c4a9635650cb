//! Key-path flattening.
//!
//! Walks the state tree into `dotted.path -> value` pairs. Plain object
//! nodes are descended into unless their own path is named in the type
//! info, in which case they travel as one value. Everything else (scalars,
//! arrays, opaque records) is a leaf. Cells are unwrapped wherever they
//! appear.

use crate::descriptor::TypeInfo;
use crate::error::CodecResult;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use urlsync_types::{MAX_DEPTH, StateError, StateNode, StateObject};

/// Flattened state: dotted key-path to value.
pub type PlainData = BTreeMap<String, Value>;

/// Flattens `state` into key-path/value pairs.
pub fn flatten(type_info: &TypeInfo, state: &StateObject) -> CodecResult<PlainData> {
    let mut data = PlainData::new();
    walk(type_info, state, |path, node| {
        data.insert(path, node.to_value()?);
        Ok(())
    })?;
    Ok(data)
}

/// The key-paths synchronized for `state`: every flattened path plus every
/// path declared in the type info.
pub fn key_paths(type_info: &TypeInfo, state: &StateObject) -> CodecResult<BTreeSet<String>> {
    let mut paths: BTreeSet<String> = type_info.keys().cloned().collect();
    walk(type_info, state, |path, _| {
        paths.insert(path);
        Ok(())
    })?;
    Ok(paths)
}

struct Frame {
    prefix: Vec<String>,
    fields: StateObject,
    visited: Vec<usize>,
}

fn walk<F>(type_info: &TypeInfo, state: &StateObject, mut on_leaf: F) -> CodecResult<()>
where
    F: FnMut(String, &StateNode) -> CodecResult<()>,
{
    let mut stack = vec![Frame {
        prefix: Vec::new(),
        fields: state.clone(),
        visited: Vec::new(),
    }];

    while let Some(frame) = stack.pop() {
        if frame.prefix.len() > MAX_DEPTH {
            return Err(StateError::DepthExceeded {
                path: frame.prefix.join("."),
            }
            .into());
        }
        for (key, child) in &frame.fields {
            let mut prefix = frame.prefix.clone();
            prefix.push(key.clone());
            let path = prefix.join(".");

            let mut visited = frame.visited.clone();
            let node = child.resolve(&mut visited, &path)?;
            match node {
                StateNode::Object(fields) if !type_info.contains(&path) => stack.push(Frame {
                    prefix,
                    fields,
                    visited,
                }),
                leaf => on_leaf(path, &leaf)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;
    use serde_json::json;
    use urlsync_types::StateCell;

    fn object(value: Value) -> StateObject {
        match StateNode::from(value) {
            StateNode::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    #[test]
    fn deep_nesting_is_reported() {
        let mut value = json!(1);
        for _ in 0..=MAX_DEPTH + 1 {
            value = json!({ "n": value });
        }
        let err = flatten(&TypeInfo::new(), &object(value)).unwrap_err();
        assert!(matches!(
            err,
            crate::CodecError::State(StateError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn typed_object_is_not_descended() {
        let info = TypeInfo::new().with("a", PrimitiveKind::Object);
        let data = flatten(&info, &object(json!({"a": {"b": 1}}))).unwrap();
        assert_eq!(data.get("a"), Some(&json!({"b": 1})));
        assert!(!data.contains_key("a.b"));
    }

    #[test]
    fn cyclic_cells_fail_instead_of_looping() {
        let cell = StateCell::new(json!(null));
        let mut inner = StateObject::new();
        inner.insert("back".into(), StateNode::Cell(cell.clone()));
        cell.set(StateNode::Object(inner));

        let mut root = StateObject::new();
        root.insert("loop".into(), StateNode::Cell(cell.clone()));
        let err = key_paths(&TypeInfo::new(), &root).unwrap_err();
        assert!(matches!(
            err,
            crate::CodecError::State(StateError::CycleDetected { .. })
        ));

        cell.set(json!(null));
    }
}
