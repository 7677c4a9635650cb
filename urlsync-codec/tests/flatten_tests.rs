use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use urlsync_codec::{PrimitiveKind, TypeInfo, flatten, key_paths};
use urlsync_types::{StateCell, StateNode, StateObject};

fn object(value: Value) -> StateObject {
    match StateNode::from(value) {
        StateNode::Object(fields) => fields,
        other => panic!("not an object: {other:?}"),
    }
}

fn paths(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn nested_objects_become_dotted_paths() {
    let state = object(json!({"a": {"b": 1, "c": 2}}));
    let data = flatten(&TypeInfo::new(), &state).unwrap();
    assert_eq!(data.get("a.b"), Some(&json!(1)));
    assert_eq!(data.get("a.c"), Some(&json!(2)));
    assert_eq!(data.len(), 2);
}

#[test]
fn typed_parent_is_kept_whole() {
    let state = object(json!({"a": {"b": 1, "c": 2}}));
    let info = TypeInfo::new().with("a", PrimitiveKind::Object);
    let data = flatten(&info, &state).unwrap();
    assert_eq!(data.get("a"), Some(&json!({"b": 1, "c": 2})));
    assert_eq!(data.len(), 1);
}

#[test]
fn typed_nested_path_is_matched_in_full() {
    let state = object(json!({"outer": {"inner": {"x": 1}}}));
    let info = TypeInfo::new().with("outer.inner", PrimitiveKind::Object);
    let data = flatten(&info, &state).unwrap();
    assert_eq!(data.get("outer.inner"), Some(&json!({"x": 1})));
    assert!(!data.contains_key("outer.inner.x"));
}

#[test]
fn arrays_and_opaque_records_are_leaves() {
    let mut state = object(json!({"tags": ["a", "b"]}));
    state.insert("when".into(), StateNode::opaque(json!({"epoch": 10})));
    let data = flatten(&TypeInfo::new(), &state).unwrap();
    assert_eq!(data.get("tags"), Some(&json!(["a", "b"])));
    assert_eq!(data.get("when"), Some(&json!({"epoch": 10})));
}

#[test]
fn cells_are_unwrapped() {
    let mut state = StateObject::new();
    state.insert("page".into(), StateNode::cell(json!(3)));
    state.insert(
        "filter".into(),
        StateNode::Cell(StateCell::new(json!({"q": "x"}))),
    );
    let data = flatten(&TypeInfo::new(), &state).unwrap();
    assert_eq!(data.get("page"), Some(&json!(3)));
    assert_eq!(data.get("filter.q"), Some(&json!("x")));
}

#[test]
fn empty_object_contributes_nothing() {
    let state = object(json!({"empty": {}, "n": null}));
    let data = flatten(&TypeInfo::new(), &state).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.get("n"), Some(&Value::Null));
}

#[test]
fn key_paths_include_declared_paths() {
    let state = object(json!({"a": {"b": 1}, "page": 1}));
    let info = TypeInfo::new().with("later", PrimitiveKind::String);
    assert_eq!(
        key_paths(&info, &state).unwrap(),
        paths(&["a.b", "later", "page"])
    );
}

#[test]
fn shared_cell_in_two_places_is_not_a_cycle() {
    let shared = StateCell::new(json!({"v": 1}));
    let mut state = StateObject::new();
    state.insert("left".into(), StateNode::Cell(shared.clone()));
    state.insert("right".into(), StateNode::Cell(shared));
    assert_eq!(
        key_paths(&TypeInfo::new(), &state).unwrap(),
        paths(&["left.v", "right.v"])
    );
}
