//! remotemap: native collection views over a remote key-value store.
//!
//! This crate ties the layers together:
//!
//! - `remotemap-kv-store`: the [`KvStore`] capability (raw bytes)
//! - `remotemap-codec`: [`Value`] and its storable encoding
//! - `remotemap-core`: [`RemoteMap`] and the sequence, mapping and set views
//! - `remotemap-memory-store`: [`MemoryStore`] for tests and embedding
//! - `remotemap-redis-store`: `RedisStore`, behind the default `redis` feature
//!
//! # Example
//!
//! ```rust
//! use remotemap::{in_memory, Value};
//!
//! let map = in_memory("root");
//! map.set("f", vec![0i64, 1, 2, 3, 4]).unwrap();
//!
//! let f = map.get("f").unwrap().into_sequence().unwrap();
//! f.set_slice(1..3, ["a", "b"]).unwrap();
//! assert_eq!(f.get(1).unwrap(), Value::from("a"));
//! assert_eq!(f.len().unwrap(), 5);
//! ```

use std::sync::Arc;

pub use remotemap_codec::{decode, encode, Value, ENCODED_MARKER};
pub use remotemap_core::{
    Config, Entry, Error, Iter, MappingView, RemoteMap, SequenceView, SetView, Slice,
    SliceIndices,
};
pub use remotemap_kv_store::{Bytes, KvStore, Shape, StoreError};
pub use remotemap_memory_store::MemoryStore;

#[cfg(feature = "redis")]
pub use remotemap_redis_store::RedisStore;

/// Open a [`RemoteMap`] on the Redis server described by `config`.
#[cfg(feature = "redis")]
pub fn connect(config: &Config) -> Result<RemoteMap, Error> {
    RemoteMap::from_config(config, |config| {
        let store = RedisStore::open(&config.url())?;
        Ok(Arc::new(store) as Arc<dyn KvStore>)
    })
}

/// A [`RemoteMap`] over a fresh, private [`MemoryStore`].
pub fn in_memory(prefix: impl Into<String>) -> RemoteMap {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    log::debug!("created in-memory store");
    RemoteMap::new(store, prefix)
}
