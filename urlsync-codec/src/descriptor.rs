//! Type descriptors.
//!
//! A descriptor is one of:
//! - a primitive kind: `"string"`, `"number"`, `"boolean"` or `"object"`
//!   (JSON)
//! - a single-element array wrapping a kind: `["number"]` declares an
//!   array of numbers
//! - a record with an optional `type` and optional custom `decode` /
//!   `encode` functions; the functions take precedence over `type`
//!
//! Descriptors without functions can be read from JSON, so a type info
//! map may live in configuration:
//!
//! ```
//! use urlsync_codec::{PrimitiveKind, TypeDescriptor, TypeInfo};
//!
//! let info = TypeInfo::from_json(r#"{"page": "number", "tags": ["string"]}"#).unwrap();
//! assert!(matches!(info.get("page"), Some(TypeDescriptor::Primitive(PrimitiveKind::Number))));
//! assert!(matches!(info.get("tags"), Some(TypeDescriptor::ArrayOf(PrimitiveKind::String))));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use urlsync_types::QueryValue;

/// Custom decoder: raw query value in, typed value out.
pub type DecodeFn = Arc<dyn Fn(&QueryValue) -> Value + Send + Sync>;

/// Custom encoder: typed value in, query string out.
pub type EncodeFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// The primitive kinds a descriptor can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    /// Any JSON value, carried as compact JSON text.
    Object,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        })
    }
}

/// How one key-path converts to and from its query form.
#[derive(Clone, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    ArrayOf(PrimitiveKind),
    Custom(CustomType),
}

impl TypeDescriptor {
    #[must_use]
    pub fn array_of(kind: PrimitiveKind) -> Self {
        Self::ArrayOf(kind)
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<CustomType> for TypeDescriptor {
    fn from(custom: CustomType) -> Self {
        Self::Custom(custom)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind:?}"),
            Self::ArrayOf(kind) => write!(f, "[{kind:?}]"),
            Self::Custom(custom) => custom.fmt(f),
        }
    }
}

/// Record descriptor: optional base type plus optional custom coders.
#[derive(Clone, Default)]
pub struct CustomType {
    pub kind: Option<Box<TypeDescriptor>>,
    pub decode: Option<DecodeFn>,
    pub encode: Option<EncodeFn>,
}

impl CustomType {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<TypeDescriptor>) -> Self {
        self.kind = Some(Box::new(kind.into()));
        self
    }

    #[must_use]
    pub fn with_decode<F>(mut self, decode: F) -> Self
    where
        F: Fn(&QueryValue) -> Value + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(decode));
        self
    }

    #[must_use]
    pub fn with_encode<F>(mut self, encode: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(encode));
        self
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("kind", &self.kind)
            .field("decode", &self.decode.is_some())
            .field("encode", &self.encode.is_some())
            .finish()
    }
}

/// Serialized descriptor shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDescriptor {
    Kind(PrimitiveKind),
    Array(Vec<PrimitiveKind>),
    Record {
        #[serde(default, rename = "type")]
        kind: Option<Box<RawDescriptor>>,
    },
}

impl TryFrom<RawDescriptor> for TypeDescriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        match raw {
            RawDescriptor::Kind(kind) => Ok(Self::Primitive(kind)),
            RawDescriptor::Array(kinds) => match kinds.as_slice() {
                [kind] => Ok(Self::ArrayOf(*kind)),
                _ => Err(format!(
                    "array descriptor must wrap exactly one kind, got {}",
                    kinds.len()
                )),
            },
            RawDescriptor::Record { kind } => {
                let kind = kind
                    .map(|raw| TypeDescriptor::try_from(*raw).map(Box::new))
                    .transpose()?;
                Ok(Self::Custom(CustomType {
                    kind,
                    decode: None,
                    encode: None,
                }))
            }
        }
    }
}

/// Descriptors keyed by dotted key-path.
///
/// Fixed for the lifetime of one sync engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TypeInfo(BTreeMap<String, TypeDescriptor>);

impl TypeInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a type info map from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Builder form of [`TypeInfo::insert`].
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.insert(path, descriptor);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, descriptor: impl Into<TypeDescriptor>) {
        self.0.insert(path.into(), descriptor.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&TypeDescriptor> {
        self.0.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, D: Into<TypeDescriptor>> FromIterator<(K, D)> for TypeInfo {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(path, desc)| (path.into(), desc.into()))
                .collect(),
        )
    }
}
