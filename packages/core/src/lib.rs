//! Native collection views over a remote key-value store.
//!
//! A [`RemoteMap`] owns a key prefix in a [`KvStore`]. Looking a key up
//! asks the store which shape it holds and returns an [`Entry`]:
//!
//! - a decoded scalar [`Value`]
//! - a [`SequenceView`] over a list, with negative indices and slices
//! - a [`MappingView`] over a hash
//! - a [`SetView`] over a set
//!
//! Views hold only a key and the store handle. Nothing is cached: every
//! read goes to the store and every write is issued immediately.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use remotemap_core::{RemoteMap, Value};
//! use remotemap_memory_store::MemoryStore;
//!
//! let map = RemoteMap::new(Arc::new(MemoryStore::new()), "root");
//! map.set("scores", vec![3i64, 1, 2]).unwrap();
//!
//! let scores = map.get("scores").unwrap().into_sequence().unwrap();
//! scores.append(5i64).unwrap();
//! assert_eq!(scores.get(-1).unwrap(), Value::from(5i64));
//! assert_eq!(map.keys().unwrap().collect::<Vec<_>>(), ["scores"]);
//! ```

pub use remotemap_codec::{decode, encode, Value};
pub use remotemap_kv_store::{Bytes, KvStore, Shape, StoreError};

mod config;
mod error;
mod map;
mod mapping;
mod sequence;
mod set;
mod slice;

pub use config::Config;
pub use error::Error;
pub use map::{Entry, RemoteMap};
pub use mapping::MappingView;
pub use sequence::{Iter, SequenceView};
pub use set::SetView;
pub use slice::{Slice, SliceIndices};
