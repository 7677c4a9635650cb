//! Value codec: typed values to query strings and back.

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::CodecResult;
use crate::resolver::{Decoder, Encoder, resolve_decoder, resolve_encoder};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::error;
use urlsync_types::QueryValue;

/// Separator used by [`ArrayFormat::Joined`] unless configured otherwise.
pub const DEFAULT_ARRAY_SEPARATOR: &str = "(*_*)";

/// Largest integer a float holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// How arrays are represented in the query.
///
/// `Repeated` writes a real multi-value parameter (`?t=a&t=b`). `Joined`
/// packs all elements into one value separated by a private token, for
/// routers that cannot store multi-value parameters. With `Joined`, an
/// element containing the separator does not survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ArrayFormat {
    #[default]
    Repeated,
    Joined { separator: String },
}

impl ArrayFormat {
    /// Joined arrays with [`DEFAULT_ARRAY_SEPARATOR`].
    #[must_use]
    pub fn joined() -> Self {
        Self::Joined {
            separator: DEFAULT_ARRAY_SEPARATOR.to_string(),
        }
    }
}

/// Encodes and decodes values according to their type descriptors.
#[derive(Debug, Clone, Default)]
pub struct ValueCodec {
    array_format: ArrayFormat,
}

impl ValueCodec {
    #[must_use]
    pub fn new(array_format: ArrayFormat) -> Self {
        Self { array_format }
    }

    #[must_use]
    pub fn array_format(&self) -> &ArrayFormat {
        &self.array_format
    }

    /// Decodes a raw query value.
    ///
    /// Only `object`-typed values can fail (malformed JSON); the error is
    /// returned to the caller untouched.
    pub fn decode(&self, raw: &QueryValue, descriptor: Option<&TypeDescriptor>) -> CodecResult<Value> {
        match resolve_decoder(descriptor) {
            Decoder::Default => Ok(self.decode_default(raw)),
            Decoder::Primitive(kind) => decode_kind(kind, raw),
            Decoder::ArrayOf(kind) => self.decode_array(kind, raw),
            Decoder::Custom(decode) => Ok(decode(raw)),
        }
    }

    /// Encodes a typed value. Never fails: a non-array value declared as
    /// an array is reported and stringified as-is.
    pub fn encode(&self, value: &Value, descriptor: Option<&TypeDescriptor>) -> QueryValue {
        match resolve_encoder(descriptor) {
            Encoder::Default => self.encode_default(value),
            Encoder::Primitive(kind) => QueryValue::Single(encode_kind(kind, value)),
            Encoder::ArrayOf(kind) => match value {
                Value::Array(items) => self.pack(items.iter().map(|item| encode_kind(kind, item)).collect()),
                other => {
                    error!(
                        target: "urlsync",
                        "{} is not an array but its type is [{}]",
                        stringify(other),
                        kind
                    );
                    QueryValue::Single(stringify(other))
                }
            },
            Encoder::Custom(encode) => QueryValue::Single(encode(value)),
        }
    }

    fn decode_default(&self, raw: &QueryValue) -> Value {
        match raw {
            QueryValue::Multi(items) => Value::Array(items.iter().map(|s| default_scalar(s)).collect()),
            QueryValue::Single(s) => match self.split(s) {
                Some(parts) => Value::Array(parts.into_iter().map(default_scalar).collect()),
                None => default_scalar(s),
            },
        }
    }

    fn decode_array(&self, kind: PrimitiveKind, raw: &QueryValue) -> CodecResult<Value> {
        let items: Vec<&str> = match (raw, &self.array_format) {
            (QueryValue::Multi(items), _) => items.iter().map(String::as_str).collect(),
            (QueryValue::Single(s), ArrayFormat::Joined { separator }) => {
                if s.is_empty() {
                    Vec::new()
                } else if separator.is_empty() {
                    vec![s.as_str()]
                } else {
                    s.split(separator.as_str()).collect()
                }
            }
            // A lone value under the repeated format is kept as it came.
            (QueryValue::Single(s), ArrayFormat::Repeated) => return Ok(Value::String(s.clone())),
        };
        items
            .into_iter()
            .map(|item| decode_text(kind, item))
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn encode_default(&self, value: &Value) -> QueryValue {
        match value {
            Value::Array(items) => self.pack(items.iter().map(stringify).collect()),
            other => QueryValue::Single(stringify(other)),
        }
    }

    fn pack(&self, items: Vec<String>) -> QueryValue {
        match &self.array_format {
            ArrayFormat::Repeated => QueryValue::Multi(items),
            ArrayFormat::Joined { separator } => QueryValue::Single(items.join(separator)),
        }
    }

    fn split<'s>(&self, s: &'s str) -> Option<Vec<&'s str>> {
        match &self.array_format {
            ArrayFormat::Joined { separator } if !separator.is_empty() && s.contains(separator.as_str()) => {
                Some(s.split(separator.as_str()).collect())
            }
            _ => None,
        }
    }
}

/// Stringifies a value the way query strings expect: strings verbatim,
/// `null` as `"null"`, numbers without a trailing `.0`, arrays as
/// comma-separated elements and records as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64().map_or_else(|| n.to_string(), |f| format!("{f}"))
}

fn encode_kind(kind: PrimitiveKind, value: &Value) -> String {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Number | PrimitiveKind::Boolean => stringify(value),
        PrimitiveKind::Object => value.to_string(),
    }
}

fn decode_kind(kind: PrimitiveKind, raw: &QueryValue) -> CodecResult<Value> {
    match raw {
        QueryValue::Single(s) => decode_text(kind, s),
        // A multi value is never falsy.
        QueryValue::Multi(_) if kind == PrimitiveKind::Boolean => Ok(Value::Bool(true)),
        QueryValue::Multi(items) => decode_text(kind, &items.join(",")),
    }
}

fn decode_text(kind: PrimitiveKind, text: &str) -> CodecResult<Value> {
    Ok(match kind {
        PrimitiveKind::String => Value::String(text.to_string()),
        PrimitiveKind::Number => parse_number(text).unwrap_or(Value::Null),
        PrimitiveKind::Boolean => Value::Bool(!(text.is_empty() || text == "false")),
        PrimitiveKind::Object => serde_json::from_str(text)?,
    })
}

fn default_scalar(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "" => Value::String(String::new()),
        _ => parse_number(text).unwrap_or_else(|| Value::String(text.to_string())),
    }
}

/// Numeric coercion of query text.
///
/// Surrounding whitespace is ignored and blank text is zero. Integers are
/// kept exact; `0x`, `0o` and `0b` prefixes are accepted. Results that are
/// not finite have no JSON form and yield `None`.
fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Value::from(0));
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(Value::from(u));
    }
    if let Some(value) = parse_radix(trimmed) {
        return Some(value);
    }
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric {
        return None;
    }
    float_value(trimmed.parse::<f64>().ok()?)
}

fn parse_radix(text: &str) -> Option<Value> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    match u64::from_str_radix(digits, radix) {
        Ok(n) => Some(Value::from(n)),
        Err(_) => float_value(
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d)),
        ),
    }
}

fn float_value(f: f64) -> Option<Value> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number)
}
