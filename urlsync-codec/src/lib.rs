//! Value codec and key-path flattening for urlsync.
//!
//! This crate turns observed state into query entries and back:
//!
//! - [`TypeDescriptor`] / [`TypeInfo`]: per key-path rules declaring how a
//!   value converts to and from its string form
//! - [`resolve_decoder`] / [`resolve_encoder`]: pick the coder a
//!   descriptor asks for (custom functions win over `type`)
//! - [`ValueCodec`]: encodes typed values to one or many strings and
//!   decodes them back, with the array representation chosen by
//!   [`ArrayFormat`]
//! - [`flatten`] / [`key_paths`]: walk the state tree into dotted
//!   key-paths, descending only into plain objects not named in the type
//!   info
//!
//! Without a descriptor, decoding recognises `true`/`false` and numbers
//! and keeps everything else as a string:
//!
//! ```
//! use serde_json::json;
//! use urlsync_codec::ValueCodec;
//! use urlsync_types::QueryValue;
//!
//! let codec = ValueCodec::default();
//! assert_eq!(codec.decode(&QueryValue::from("42"), None).unwrap(), json!(42));
//! assert_eq!(codec.decode(&QueryValue::from("true"), None).unwrap(), json!(true));
//! assert_eq!(codec.decode(&QueryValue::from("abc"), None).unwrap(), json!("abc"));
//! ```

mod codec;
mod descriptor;
mod error;
mod flatten;
mod resolver;

pub use codec::{ArrayFormat, DEFAULT_ARRAY_SEPARATOR, ValueCodec, stringify};
pub use descriptor::{CustomType, DecodeFn, EncodeFn, PrimitiveKind, TypeDescriptor, TypeInfo};
pub use error::{CodecError, CodecResult};
pub use flatten::{PlainData, flatten, key_paths};
pub use resolver::{Decoder, Encoder, resolve_decoder, resolve_encoder};
