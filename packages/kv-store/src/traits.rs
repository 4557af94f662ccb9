//! The store handle capability.

use std::sync::Arc;

use bytes::Bytes;

use crate::{Shape, StoreError};

/// Primitive operations of a remote key-value store.
///
/// Keys are plain strings. Values, list elements, hash values and set
/// members are opaque bytes. Every method is a single remote round trip
/// and is expected to be atomic on the store's side; nothing in this trait
/// composes primitives.
///
/// List indices follow the remote store's convention: they are signed and
/// negative values count from the end (`-1` is the last element). The
/// `stop` bound of [`list_range`](KvStore::list_range) and
/// [`list_trim`](KvStore::list_trim) is inclusive.
///
/// Collections that become empty cease to exist: popping the last element
/// of a list, deleting the last field of a hash or removing the last member
/// of a set removes the key.
///
/// # Object Safety
///
/// This trait is object-safe: views share a `Arc<dyn KvStore>`.
/// Implementations must be safe to call from several views at once, which
/// is why every method takes `&self`.
pub trait KvStore: Send + Sync {
    // === Keys ===

    /// Whether `key` exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// The shape of the value at `key`, or `None` if the key is absent.
    fn shape_of(&self, key: &str) -> Result<Option<Shape>, StoreError>;

    /// Read a scalar.
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Write a scalar, replacing whatever was at `key`.
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Delete `key` whatever its shape. Returns the number of keys removed.
    fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// Every key in the store.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    // === Lists ===

    /// Length of the list at `key` (0 if absent).
    fn list_len(&self, key: &str) -> Result<usize, StoreError>;

    /// Element at `index`, or `None` if out of range.
    fn list_get(&self, key: &str, index: i64) -> Result<Option<Bytes>, StoreError>;

    /// Overwrite the element at `index`.
    ///
    /// Fails with [`StoreError::IndexOutOfRange`] if there is no such element.
    fn list_set(&self, key: &str, index: i64, value: Bytes) -> Result<(), StoreError>;

    /// Elements `start..=stop`.
    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError>;

    /// Keep only elements `start..=stop`.
    fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError>;

    /// Prepend. Returns the new length.
    fn list_push_left(&self, key: &str, value: Bytes) -> Result<usize, StoreError>;

    /// Append. Returns the new length.
    fn list_push_right(&self, key: &str, value: Bytes) -> Result<usize, StoreError>;

    /// Remove and return the first element.
    fn list_pop_left(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Remove and return the last element.
    fn list_pop_right(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    // === Hashes ===

    /// Whether the hash at `key` has `field` (`false` if the key is absent).
    fn hash_exists(&self, key: &str, field: &str) -> Result<bool, StoreError>;

    /// Value of `field`, or `None` if the field or the key is absent.
    fn hash_get(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError>;

    /// Write `field`, creating the hash if needed.
    fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<(), StoreError>;

    /// Delete `field`. Returns the number of fields removed (0 or 1).
    fn hash_delete(&self, key: &str, field: &str) -> Result<u64, StoreError>;

    /// Field names of the hash at `key`, in no particular order.
    fn hash_fields(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Number of fields (0 if absent).
    fn hash_len(&self, key: &str) -> Result<usize, StoreError>;

    // === Sets ===

    /// Whether `member` is in the set at `key` (`false` if the key is absent).
    fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool, StoreError>;

    /// Every member of the set at `key`, in no particular order.
    fn set_members(&self, key: &str) -> Result<Vec<Bytes>, StoreError>;

    /// Number of members (0 if absent).
    fn set_len(&self, key: &str) -> Result<usize, StoreError>;

    /// Add `member`, creating the set if needed.
    ///
    /// Returns `true` if the member was not already present.
    fn set_add(&self, key: &str, member: Bytes) -> Result<bool, StoreError>;

    /// Remove `member`. Returns `true` if the member was present.
    fn set_remove(&self, key: &str, member: &[u8]) -> Result<bool, StoreError>;

    /// Remove and return an arbitrary member, or `None` if the set is empty.
    fn set_pop(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
}

// Blanket implementations for references and smart pointers

macro_rules! delegate_kv_store {
    ([$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> KvStore for $ty {
            fn exists(&self, key: &str) -> Result<bool, StoreError> {
                (**self).exists(key)
            }

            fn shape_of(&self, key: &str) -> Result<Option<Shape>, StoreError> {
                (**self).shape_of(key)
            }

            fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
                (**self).get(key)
            }

            fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
                (**self).put(key, value)
            }

            fn delete(&self, key: &str) -> Result<u64, StoreError> {
                (**self).delete(key)
            }

            fn keys(&self) -> Result<Vec<String>, StoreError> {
                (**self).keys()
            }

            fn list_len(&self, key: &str) -> Result<usize, StoreError> {
                (**self).list_len(key)
            }

            fn list_get(&self, key: &str, index: i64) -> Result<Option<Bytes>, StoreError> {
                (**self).list_get(key, index)
            }

            fn list_set(&self, key: &str, index: i64, value: Bytes) -> Result<(), StoreError> {
                (**self).list_set(key, index, value)
            }

            fn list_range(
                &self,
                key: &str,
                start: i64,
                stop: i64,
            ) -> Result<Vec<Bytes>, StoreError> {
                (**self).list_range(key, start, stop)
            }

            fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
                (**self).list_trim(key, start, stop)
            }

            fn list_push_left(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
                (**self).list_push_left(key, value)
            }

            fn list_push_right(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
                (**self).list_push_right(key, value)
            }

            fn list_pop_left(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
                (**self).list_pop_left(key)
            }

            fn list_pop_right(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
                (**self).list_pop_right(key)
            }

            fn hash_exists(&self, key: &str, field: &str) -> Result<bool, StoreError> {
                (**self).hash_exists(key, field)
            }

            fn hash_get(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError> {
                (**self).hash_get(key, field)
            }

            fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<(), StoreError> {
                (**self).hash_set(key, field, value)
            }

            fn hash_delete(&self, key: &str, field: &str) -> Result<u64, StoreError> {
                (**self).hash_delete(key, field)
            }

            fn hash_fields(&self, key: &str) -> Result<Vec<String>, StoreError> {
                (**self).hash_fields(key)
            }

            fn hash_len(&self, key: &str) -> Result<usize, StoreError> {
                (**self).hash_len(key)
            }

            fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
                (**self).set_contains(key, member)
            }

            fn set_members(&self, key: &str) -> Result<Vec<Bytes>, StoreError> {
                (**self).set_members(key)
            }

            fn set_len(&self, key: &str) -> Result<usize, StoreError> {
                (**self).set_len(key)
            }

            fn set_add(&self, key: &str, member: Bytes) -> Result<bool, StoreError> {
                (**self).set_add(key, member)
            }

            fn set_remove(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
                (**self).set_remove(key, member)
            }

            fn set_pop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
                (**self).set_pop(key)
            }
        }
    };
}

delegate_kv_store!(['a, T: KvStore + ?Sized] &'a T);
delegate_kv_store!([T: KvStore + ?Sized] Box<T>);
delegate_kv_store!([T: KvStore + ?Sized] Arc<T>);
