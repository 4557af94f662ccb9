//! The root mapping: a prefixed namespace of keys in a remote store.
//!
//! A lookup asks the store which shape the key holds and answers with the
//! matching [`Entry`]. An assignment replaces whatever the key held with
//! the shape of the assigned [`Value`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use remotemap_codec::{decode, encode, Value};
use remotemap_kv_store::{KvStore, Shape, StoreError};

use crate::{Config, Error, MappingView, SequenceView, SetView};

/// Joins the prefix and a logical key into a physical key.
pub(crate) const SEPARATOR: char = '.';

/// What a key holds: a decoded scalar or a view over a remote collection.
#[derive(Clone, Debug)]
pub enum Entry {
    Scalar(Value),
    Sequence(SequenceView),
    Mapping(MappingView),
    Set(SetView),
}

impl Entry {
    pub fn shape(&self) -> Shape {
        match self {
            Entry::Scalar(_) => Shape::Scalar,
            Entry::Sequence(_) => Shape::Sequence,
            Entry::Mapping(_) => Shape::Mapping,
            Entry::Set(_) => Shape::Set,
        }
    }

    /// Materialize the entry. Collections are read in full.
    pub fn into_value(self) -> Result<Value, Error> {
        Ok(match self {
            Entry::Scalar(value) => value,
            Entry::Sequence(view) => Value::Array(view.to_vec()?),
            Entry::Mapping(view) => Value::Map(view.to_map()?),
            Entry::Set(view) => Value::Set(view.to_vec()?),
        })
    }

    pub fn into_scalar(self) -> Result<Value, Error> {
        match self {
            Entry::Scalar(value) => Ok(value),
            other => Err(Error::type_mismatch(Shape::Scalar, other.shape())),
        }
    }

    pub fn into_sequence(self) -> Result<SequenceView, Error> {
        match self {
            Entry::Sequence(view) => Ok(view),
            other => Err(Error::type_mismatch(Shape::Sequence, other.shape())),
        }
    }

    pub fn into_mapping(self) -> Result<MappingView, Error> {
        match self {
            Entry::Mapping(view) => Ok(view),
            other => Err(Error::type_mismatch(Shape::Mapping, other.shape())),
        }
    }

    pub fn into_set(self) -> Result<SetView, Error> {
        match self {
            Entry::Set(view) => Ok(view),
            other => Err(Error::type_mismatch(Shape::Set, other.shape())),
        }
    }
}

/// A namespace of logical keys over a shared [`KvStore`].
///
/// Logical key `k` lives at physical key `prefix.k`. Two maps sharing a
/// store must not use prefixes where one is a prefix of the other.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use remotemap_core::{Entry, RemoteMap, Value};
/// use remotemap_memory_store::MemoryStore;
///
/// let map = RemoteMap::new(Arc::new(MemoryStore::new()), "app");
/// map.set("greeting", "hello").unwrap();
/// map.set("tags", Value::set_of(["a", "b"])).unwrap();
///
/// assert_eq!(map.get("greeting").unwrap().into_scalar().unwrap(), Value::from("hello"));
/// assert!(matches!(map.get("tags").unwrap(), Entry::Set(_)));
/// assert_eq!(map.physical_key("tags"), "app.tags");
/// ```
#[derive(Clone)]
pub struct RemoteMap {
    prefix: String,
    store: Arc<dyn KvStore>,
}

impl RemoteMap {
    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store,
        }
    }

    /// Validate `config` and open a store with `connect`.
    ///
    /// `connect` receives the validated config, so callers can plug in any
    /// client constructor.
    pub fn from_config<F>(config: &Config, connect: F) -> Result<Self, Error>
    where
        F: FnOnce(&Config) -> Result<Arc<dyn KvStore>, StoreError>,
    {
        config.validate()?;
        let store = connect(config)?;
        log::debug!("opened remote map '{}' at {}", config.prefix, config.url());
        Ok(Self::new(store, config.prefix.clone()))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// The store key a logical key lives at.
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, SEPARATOR, key)
    }

    /// Look up `key`, failing with [`Error::KeyNotFound`] if it is absent.
    pub fn get(&self, key: &str) -> Result<Entry, Error> {
        let physical = self.physical_key(key);
        let not_found = || Error::KeyNotFound(key.to_string());

        let shape = self.store.shape_of(&physical)?.ok_or_else(not_found)?;
        if let Some(view) = self.collection(&physical, shape) {
            return Ok(view);
        }
        // The key can vanish between the shape query and the read.
        let raw = self.store.get(&physical)?.ok_or_else(not_found)?;
        Ok(Entry::Scalar(decode(&raw)))
    }

    pub fn get_opt(&self, key: &str) -> Result<Option<Entry>, Error> {
        match self.get(key) {
            Ok(entry) => Ok(Some(entry)),
            Err(Error::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Named accessor for attribute-style lookups.
    pub fn attribute(&self, name: &str) -> Result<Entry, Error> {
        self.get(name).map_err(|e| match e {
            Error::KeyNotFound(key) => Error::AttributeNotFound(key),
            other => other,
        })
    }

    pub fn contains(&self, key: &str) -> Result<bool, Error> {
        Ok(self.store.exists(&self.physical_key(key))?)
    }

    /// Replace whatever `key` holds with `value`.
    ///
    /// Arrays, maps and sets become the matching remote collection, every
    /// other value is encoded into a scalar. The old content is deleted
    /// first, so the key may change shape. An empty collection leaves the
    /// key absent.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        let value = value.into();
        let physical = self.physical_key(key);
        log::debug!("set {} ({})", physical, value.shape());

        self.store.delete(&physical)?;
        let store = Arc::clone(&self.store);
        match value {
            Value::Array(items) => SequenceView::new(physical, store).replace_all(items),
            Value::Map(fields) => MappingView::new(physical, store).replace_all(fields),
            Value::Set(members) => SetView::new(physical, store).replace_all(members),
            scalar => {
                self.store.put(&physical, encode(&scalar))?;
                Ok(())
            }
        }
    }

    /// Remove `key`, failing with [`Error::KeyNotFound`] if it is absent.
    pub fn delete(&self, key: &str) -> Result<(), Error> {
        let physical = self.physical_key(key);
        if self.store.delete(&physical)? == 0 {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        log::debug!("deleted {}", physical);
        Ok(())
    }

    /// Remove `key` and return what it held, materialized.
    pub fn pop(&self, key: &str) -> Result<Value, Error> {
        let value = self.get(key)?.into_value()?;
        self.delete(key)?;
        Ok(value)
    }

    /// Return the entry at `key`, storing `default` there first if absent.
    pub fn get_or_insert(&self, key: &str, default: impl Into<Value>) -> Result<Entry, Error> {
        if let Some(entry) = self.get_opt(key)? {
            return Ok(entry);
        }
        let value = default.into();
        self.set(key, value.clone())?;
        Ok(self
            .collection(&self.physical_key(key), value.shape())
            .unwrap_or_else(|| Entry::Scalar(value)))
    }

    /// Assign every `(key, value)` pair.
    pub fn update<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>) -> Result<(), Error>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Logical keys under this map's prefix.
    ///
    /// Each call takes a fresh listing of the whole store and keeps only
    /// the keys in this namespace.
    pub fn keys(&self) -> Result<impl Iterator<Item = String>, Error> {
        let namespace = format!("{}{}", self.prefix, SEPARATOR);
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(move |physical| {
                physical
                    .strip_prefix(namespace.as_str())
                    .map(str::to_string)
            }))
    }

    /// Number of keys under this map's prefix.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.keys()?.count())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Every key under the prefix with its materialized value.
    ///
    /// Keys deleted by another client while this runs are skipped.
    pub fn entries(&self) -> Result<BTreeMap<String, Value>, Error> {
        let mut entries = BTreeMap::new();
        for key in self.keys()? {
            if let Some(entry) = self.get_opt(&key)? {
                entries.insert(key, entry.into_value()?);
            }
        }
        Ok(entries)
    }

    /// Delete every key under the prefix. Keys outside it are untouched.
    pub fn clear(&self) -> Result<(), Error> {
        let mut removed = 0;
        for key in self.keys()? {
            removed += self.store.delete(&self.physical_key(&key))?;
        }
        log::debug!("cleared {} keys under '{}'", removed, self.prefix);
        Ok(())
    }

    /// A view bound to `physical`, or `None` for scalars, which are read
    /// rather than bound.
    fn collection(&self, physical: &str, shape: Shape) -> Option<Entry> {
        let store = Arc::clone(&self.store);
        Some(match shape {
            Shape::Scalar => return None,
            Shape::Sequence => Entry::Sequence(SequenceView::new(physical, store)),
            Shape::Mapping => Entry::Mapping(MappingView::new(physical, store)),
            Shape::Set => Entry::Set(SetView::new(physical, store)),
        })
    }
}

impl fmt::Debug for RemoteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteMap")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
