//! Values and their storable form.
//!
//! This crate holds the leaf of the remotemap stack:
//! - `Value`: the dynamically typed tree callers read and write
//! - `encode` / `decode`: the conversion between a `Value` and the opaque
//!   bytes a remote store keeps
//!
//! Plain text is stored as-is so that keys stay readable with the store's
//! own tooling. Everything else is tagged and serialized reversibly.
//!
//! # Example
//!
//! ```rust
//! use remotemap_codec::{decode, encode, Value};
//!
//! let stored = encode(&Value::from("hello"));
//! assert_eq!(&stored[..], b"hello");
//!
//! let value = Value::from(vec![1i64, 2, 3]);
//! assert_eq!(decode(&encode(&value)), value);
//! ```

pub use bytes::Bytes;

mod codec;
mod value;

pub use codec::{decode, encode, ENCODED_MARKER};
pub use value::Value;
