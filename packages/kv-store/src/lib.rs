//! Remote key-value store primitives.
//!
//! This is the narrow waist of the remotemap stack. Everything at this level
//! is pure bytes: keys are strings, values are opaque byte strings, and the
//! only semantics are the ones the remote store itself provides (scalars,
//! lists, hashes and sets addressed by key).
//!
//! Nothing here knows how values are encoded or how collections are
//! presented to callers. That belongs in `remotemap-codec` and
//! `remotemap-core`.
//!
//! # Example
//!
//! ```rust
//! use remotemap_kv_store::{Bytes, KvStore, StoreError};
//!
//! fn tail(store: &dyn KvStore, key: &str) -> Result<Option<Bytes>, StoreError> {
//!     let len = store.list_len(key)? as i64;
//!     store.list_get(key, len - 1)
//! }
//! ```

pub use bytes::Bytes;

mod error;
mod shape;
mod traits;

pub use error::StoreError;
pub use shape::Shape;
pub use traits::KvStore;
