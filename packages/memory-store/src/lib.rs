//! In-memory store implementing the remote store primitives.
//!
//! `MemoryStore` behaves like a single remote store instance: the same
//! index conventions, the same "empty collections disappear" rule and the
//! same wrong-type failures. It is what the remotemap test suites run
//! against, and it is usable on its own wherever a process-local map with
//! the same shape model is enough.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bytes::Bytes;
use parking_lot::Mutex;
use remotemap_kv_store::{KvStore, Shape, StoreError};

/// A stored value.
#[derive(Clone, Debug)]
enum Slot {
    Scalar(Bytes),
    List(VecDeque<Bytes>),
    Hash(BTreeMap<String, Bytes>),
    Set(BTreeSet<Bytes>),
}

impl Slot {
    fn shape(&self) -> Shape {
        match self {
            Slot::Scalar(_) => Shape::Scalar,
            Slot::List(_) => Shape::Sequence,
            Slot::Hash(_) => Shape::Mapping,
            Slot::Set(_) => Shape::Set,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Slot::Scalar(_) => false,
            Slot::List(list) => list.is_empty(),
            Slot::Hash(hash) => hash.is_empty(),
            Slot::Set(set) => set.is_empty(),
        }
    }
}

/// An in-memory key-value store.
///
/// # Example
///
/// ```rust
/// use remotemap_kv_store::{Bytes, KvStore, Shape};
/// use remotemap_memory_store::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.list_push_right("nums", Bytes::from_static(b"1")).unwrap();
/// store.list_push_right("nums", Bytes::from_static(b"2")).unwrap();
///
/// assert_eq!(store.shape_of("nums").unwrap(), Some(Shape::Sequence));
/// assert_eq!(store.list_range("nums", 0, -1).unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, Slot>>,
}

type Data = BTreeMap<String, Slot>;

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every key.
    pub fn flush(&self) {
        self.data.lock().clear();
    }

    /// Number of keys held.
    pub fn key_count(&self) -> usize {
        self.data.lock().len()
    }
}

fn wrong_type(key: &str, expected: Shape, found: &Slot) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        found: found.shape(),
    }
}

/// Drop `key` if its collection has become empty.
fn prune(data: &mut Data, key: &str) {
    if data.get(key).is_some_and(Slot::is_empty) {
        data.remove(key);
    }
}

fn list<'a>(data: &'a Data, key: &str) -> Result<Option<&'a VecDeque<Bytes>>, StoreError> {
    match data.get(key) {
        None => Ok(None),
        Some(Slot::List(list)) => Ok(Some(list)),
        Some(other) => Err(wrong_type(key, Shape::Sequence, other)),
    }
}

fn list_mut<'a>(data: &'a mut Data, key: &str) -> Result<&'a mut VecDeque<Bytes>, StoreError> {
    let slot = data
        .entry(key.to_string())
        .or_insert_with(|| Slot::List(VecDeque::new()));
    match slot {
        Slot::List(list) => Ok(list),
        other => Err(wrong_type(key, Shape::Sequence, other)),
    }
}

fn hash<'a>(data: &'a Data, key: &str) -> Result<Option<&'a BTreeMap<String, Bytes>>, StoreError> {
    match data.get(key) {
        None => Ok(None),
        Some(Slot::Hash(hash)) => Ok(Some(hash)),
        Some(other) => Err(wrong_type(key, Shape::Mapping, other)),
    }
}

fn hash_mut<'a>(
    data: &'a mut Data,
    key: &str,
) -> Result<&'a mut BTreeMap<String, Bytes>, StoreError> {
    let slot = data
        .entry(key.to_string())
        .or_insert_with(|| Slot::Hash(BTreeMap::new()));
    match slot {
        Slot::Hash(hash) => Ok(hash),
        other => Err(wrong_type(key, Shape::Mapping, other)),
    }
}

fn set<'a>(data: &'a Data, key: &str) -> Result<Option<&'a BTreeSet<Bytes>>, StoreError> {
    match data.get(key) {
        None => Ok(None),
        Some(Slot::Set(set)) => Ok(Some(set)),
        Some(other) => Err(wrong_type(key, Shape::Set, other)),
    }
}

fn set_mut<'a>(data: &'a mut Data, key: &str) -> Result<&'a mut BTreeSet<Bytes>, StoreError> {
    let slot = data
        .entry(key.to_string())
        .or_insert_with(|| Slot::Set(BTreeSet::new()));
    match slot {
        Slot::Set(set) => Ok(set),
        other => Err(wrong_type(key, Shape::Set, other)),
    }
}

/// Resolve a possibly negative index against `len`.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// Resolve an inclusive `start..=stop` range the way the remote store does:
/// negative bounds count from the end, out-of-range bounds are clamped.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

impl KvStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().contains_key(key))
    }

    fn shape_of(&self, key: &str) -> Result<Option<Shape>, StoreError> {
        Ok(self.data.lock().get(key).map(Slot::shape))
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        match self.data.lock().get(key) {
            None => Ok(None),
            Some(Slot::Scalar(bytes)) => Ok(Some(bytes.clone())),
            Some(other) => Err(wrong_type(key, Shape::Scalar, other)),
        }
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.data.lock().insert(key.to_string(), Slot::Scalar(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.data.lock().remove(key).map_or(0, |_| 1))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.lock().keys().cloned().collect())
    }

    fn list_len(&self, key: &str) -> Result<usize, StoreError> {
        let data = self.data.lock();
        Ok(list(&data, key)?.map_or(0, VecDeque::len))
    }

    fn list_get(&self, key: &str, index: i64) -> Result<Option<Bytes>, StoreError> {
        let data = self.data.lock();
        let Some(list) = list(&data, key)? else {
            return Ok(None);
        };
        Ok(resolve_index(list.len(), index).map(|i| list[i].clone()))
    }

    fn list_set(&self, key: &str, index: i64, value: Bytes) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        let out_of_range = || StoreError::IndexOutOfRange {
            key: key.to_string(),
            index,
        };
        match data.get_mut(key) {
            None => Err(out_of_range()),
            Some(Slot::List(list)) => {
                let i = resolve_index(list.len(), index).ok_or_else(out_of_range)?;
                list[i] = value;
                Ok(())
            }
            Some(other) => Err(wrong_type(key, Shape::Sequence, other)),
        }
    }

    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        let data = self.data.lock();
        let Some(list) = list(&data, key)? else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(list.len(), start, stop) {
            Some((start, stop)) => list.range(start..=stop).cloned().collect(),
            None => Vec::new(),
        })
    }

    fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        if list(&data, key)?.is_none() {
            return Ok(());
        }
        let list = list_mut(&mut data, key)?;
        match resolve_range(list.len(), start, stop) {
            Some((start, stop)) => {
                list.truncate(stop + 1);
                list.drain(..start);
            }
            None => list.clear(),
        }
        prune(&mut data, key);
        Ok(())
    }

    fn list_push_left(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
        let mut data = self.data.lock();
        let list = list_mut(&mut data, key)?;
        list.push_front(value);
        Ok(list.len())
    }

    fn list_push_right(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
        let mut data = self.data.lock();
        let list = list_mut(&mut data, key)?;
        list.push_back(value);
        Ok(list.len())
    }

    fn list_pop_left(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut data = self.data.lock();
        if list(&data, key)?.is_none() {
            return Ok(None);
        }
        let popped = list_mut(&mut data, key)?.pop_front();
        prune(&mut data, key);
        Ok(popped)
    }

    fn list_pop_right(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut data = self.data.lock();
        if list(&data, key)?.is_none() {
            return Ok(None);
        }
        let popped = list_mut(&mut data, key)?.pop_back();
        prune(&mut data, key);
        Ok(popped)
    }

    fn hash_exists(&self, key: &str, field: &str) -> Result<bool, StoreError> {
        let data = self.data.lock();
        Ok(hash(&data, key)?.is_some_and(|h| h.contains_key(field)))
    }

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError> {
        let data = self.data.lock();
        Ok(hash(&data, key)?.and_then(|h| h.get(field).cloned()))
    }

    fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        hash_mut(&mut data, key)?.insert(field.to_string(), value);
        Ok(())
    }

    fn hash_delete(&self, key: &str, field: &str) -> Result<u64, StoreError> {
        let mut data = self.data.lock();
        if hash(&data, key)?.is_none() {
            return Ok(0);
        }
        let removed = hash_mut(&mut data, key)?.remove(field).map_or(0, |_| 1);
        prune(&mut data, key);
        Ok(removed)
    }

    fn hash_fields(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let data = self.data.lock();
        Ok(hash(&data, key)?.map_or_else(Vec::new, |h| h.keys().cloned().collect()))
    }

    fn hash_len(&self, key: &str) -> Result<usize, StoreError> {
        let data = self.data.lock();
        Ok(hash(&data, key)?.map_or(0, BTreeMap::len))
    }

    fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        let data = self.data.lock();
        Ok(set(&data, key)?.is_some_and(|s| s.contains(member)))
    }

    fn set_members(&self, key: &str) -> Result<Vec<Bytes>, StoreError> {
        let data = self.data.lock();
        Ok(set(&data, key)?.map_or_else(Vec::new, |s| s.iter().cloned().collect()))
    }

    fn set_len(&self, key: &str) -> Result<usize, StoreError> {
        let data = self.data.lock();
        Ok(set(&data, key)?.map_or(0, BTreeSet::len))
    }

    fn set_add(&self, key: &str, member: Bytes) -> Result<bool, StoreError> {
        let mut data = self.data.lock();
        Ok(set_mut(&mut data, key)?.insert(member))
    }

    fn set_remove(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        let mut data = self.data.lock();
        if set(&data, key)?.is_none() {
            return Ok(false);
        }
        let removed = set_mut(&mut data, key)?.remove(member);
        prune(&mut data, key);
        Ok(removed)
    }

    fn set_pop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut data = self.data.lock();
        if set(&data, key)?.is_none() {
            return Ok(None);
        }
        let popped = set_mut(&mut data, key)?.pop_first();
        prune(&mut data, key);
        Ok(popped)
    }
}
