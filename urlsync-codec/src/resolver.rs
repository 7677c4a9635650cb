//! Descriptor resolution.
//!
//! Turns an optional descriptor into the coder to run. Decoding and
//! encoding resolve separately: a record with only a custom `decode`
//! still encodes through its `type` (or the default coder).

use crate::descriptor::{DecodeFn, EncodeFn, PrimitiveKind, TypeDescriptor};

/// The decoder selected for a key-path.
#[derive(Clone, Copy)]
pub enum Decoder<'a> {
    Default,
    Primitive(PrimitiveKind),
    ArrayOf(PrimitiveKind),
    Custom(&'a DecodeFn),
}

/// The encoder selected for a key-path.
#[derive(Clone, Copy)]
pub enum Encoder<'a> {
    Default,
    Primitive(PrimitiveKind),
    ArrayOf(PrimitiveKind),
    Custom(&'a EncodeFn),
}

pub fn resolve_decoder(descriptor: Option<&TypeDescriptor>) -> Decoder<'_> {
    match descriptor {
        None => Decoder::Default,
        Some(TypeDescriptor::Primitive(kind)) => Decoder::Primitive(*kind),
        Some(TypeDescriptor::ArrayOf(kind)) => Decoder::ArrayOf(*kind),
        Some(TypeDescriptor::Custom(custom)) => match (&custom.decode, &custom.kind) {
            (Some(decode), _) => Decoder::Custom(decode),
            (None, Some(kind)) => resolve_decoder(Some(kind.as_ref())),
            (None, None) => Decoder::Default,
        },
    }
}

pub fn resolve_encoder(descriptor: Option<&TypeDescriptor>) -> Encoder<'_> {
    match descriptor {
        None => Encoder::Default,
        Some(TypeDescriptor::Primitive(kind)) => Encoder::Primitive(*kind),
        Some(TypeDescriptor::ArrayOf(kind)) => Encoder::ArrayOf(*kind),
        Some(TypeDescriptor::Custom(custom)) => match (&custom.encode, &custom.kind) {
            (Some(encode), _) => Encoder::Custom(encode),
            (None, Some(kind)) => resolve_encoder(Some(kind.as_ref())),
            (None, None) => Encoder::Default,
        },
    }
}

impl std::fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Primitive(kind) => write!(f, "Primitive({kind:?})"),
            Self::ArrayOf(kind) => write!(f, "ArrayOf({kind:?})"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl std::fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Primitive(kind) => write!(f, "Primitive({kind:?})"),
            Self::ArrayOf(kind) => write!(f, "ArrayOf({kind:?})"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CustomType;
    use serde_json::Value;

    #[test]
    fn no_descriptor_is_default() {
        assert!(matches!(resolve_decoder(None), Decoder::Default));
        assert!(matches!(resolve_encoder(None), Encoder::Default));
    }

    #[test]
    fn record_functions_win_over_type() {
        let desc: TypeDescriptor = CustomType::new()
            .with_kind(PrimitiveKind::Number)
            .with_decode(|_| Value::Null)
            .with_encode(|_| String::new())
            .into();
        assert!(matches!(resolve_decoder(Some(&desc)), Decoder::Custom(_)));
        assert!(matches!(resolve_encoder(Some(&desc)), Encoder::Custom(_)));
    }

    #[test]
    fn record_type_is_followed_per_direction() {
        let desc: TypeDescriptor = CustomType::new()
            .with_kind(TypeDescriptor::array_of(PrimitiveKind::Boolean))
            .with_decode(|_| Value::Null)
            .into();
        assert!(matches!(resolve_decoder(Some(&desc)), Decoder::Custom(_)));
        assert!(matches!(
            resolve_encoder(Some(&desc)),
            Encoder::ArrayOf(PrimitiveKind::Boolean)
        ));
    }

    #[test]
    fn empty_record_is_default() {
        let desc: TypeDescriptor = CustomType::new().into();
        assert!(matches!(resolve_decoder(Some(&desc)), Decoder::Default));
        assert!(matches!(resolve_encoder(Some(&desc)), Encoder::Default));
    }

    #[test]
    fn nested_records_resolve_to_the_innermost_type() {
        let desc: TypeDescriptor = CustomType::new()
            .with_kind(CustomType::new().with_kind(PrimitiveKind::Object))
            .into();
        assert!(matches!(
            resolve_decoder(Some(&desc)),
            Decoder::Primitive(PrimitiveKind::Object)
        ));
    }
}
