//! Query mappings and locations.
//!
//! A query maps each key to either a single string or a sequence of
//! strings, mirroring what a router exposes for `?a=1&b=x&b=y`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// The value of one query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    /// Only an empty single value is falsy. A multi value is always
    /// present, even when it holds no elements.
    pub fn is_falsy(&self) -> bool {
        matches!(self, Self::Single(s) if s.is_empty())
    }

    /// Returns the single value, if this is not a multi value.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Multi(_) => None,
        }
    }

    /// Returns the first string of the value.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Multi(items) => items.first().map(String::as_str),
        }
    }

    /// Returns all strings of the value.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s.clone()],
            Self::Multi(items) => items.clone(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(items: Vec<String>) -> Self {
        Self::Multi(items)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(items: Vec<&str>) -> Self {
        Self::Multi(items.into_iter().map(str::to_string).collect())
    }
}

/// A query mapping, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, QueryValue>);

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string such as `a=1&b=x&b=y`.
    ///
    /// A leading `?` is ignored, `+` decodes to a space and keys repeated
    /// more than once become multi values. A key without `=` maps to an
    /// empty single value.
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        let mut query = Self::new();
        for pair in input.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            let value = decode_component(value);
            match query.0.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(QueryValue::Single(value));
                }
                btree_map::Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    *existing = match std::mem::replace(existing, QueryValue::Multi(Vec::new())) {
                        QueryValue::Single(first) => QueryValue::Multi(vec![first, value]),
                        QueryValue::Multi(mut items) => {
                            items.push(value);
                            QueryValue::Multi(items)
                        }
                    };
                }
            }
        }
        query
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.0.iter()
    }

    /// Lays `overlay` over this query: keys present in both take the
    /// overlay's value.
    #[must_use]
    pub fn merge(mut self, overlay: Query) -> Self {
        self.0.extend(overlay.0);
        self
    }

    /// Drops every entry holding an empty single value.
    #[must_use]
    pub fn without_empty(mut self) -> Self {
        self.0.retain(|_, value| !value.is_falsy());
        self
    }
}

impl FromIterator<(String, QueryValue)> for Query {
    fn from_iter<I: IntoIterator<Item = (String, QueryValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a String, &'a QueryValue);
    type IntoIter = btree_map::Iter<'a, String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            let key = urlencoding::encode(key);
            let items: &[String] = match value {
                QueryValue::Single(s) => std::slice::from_ref(s),
                QueryValue::Multi(items) => items,
            };
            for item in items {
                if !first {
                    f.write_str("&")?;
                }
                first = false;
                write!(f, "{}={}", key, urlencoding::encode(item))?;
            }
        }
        Ok(())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // Invalid UTF-8 after decoding: keep the raw text.
        Err(_) => spaced,
    }
}

/// A location: a path plus its query mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default)]
    pub query: Query,
}

impl Location {
    pub fn new(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Parses `/path?a=1`. A fragment after `#` is dropped.
    pub fn parse(input: &str) -> Self {
        let input = input.split_once('#').map_or(input, |(before, _)| before);
        match input.split_once('?') {
            Some((path, query)) => Self::new(path, Query::parse(query)),
            None => Self::new(input, Query::new()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}
