//! Mapping view: a remote hash presented as a field -> value map.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use remotemap_codec::{decode, encode, Value};
use remotemap_kv_store::KvStore;

use crate::Error;

/// A remote hash viewed as a map from field names to [`Value`]s.
///
/// Field names are stored verbatim; values go through the codec.
#[derive(Clone)]
pub struct MappingView {
    key: String,
    store: Arc<dyn KvStore>,
}

impl MappingView {
    /// Bind a view to the hash at physical `key`.
    pub fn new(key: impl Into<String>, store: Arc<dyn KvStore>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    /// The physical key this view is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read `field`, failing with [`Error::FieldNotFound`] if it is absent.
    pub fn get(&self, field: &str) -> Result<Value, Error> {
        self.get_opt(field)?.ok_or_else(|| Error::FieldNotFound(field.to_string()))
    }

    pub fn get_opt(&self, field: &str) -> Result<Option<Value>, Error> {
        Ok(self
            .store
            .hash_get(&self.key, field)?
            .map(|raw| decode(&raw)))
    }

    /// Named accessor for attribute-style lookups.
    pub fn attribute(&self, name: &str) -> Result<Value, Error> {
        self.get(name).map_err(|e| match e {
            Error::FieldNotFound(field) => Error::AttributeNotFound(field),
            other => other,
        })
    }

    pub fn contains(&self, field: &str) -> Result<bool, Error> {
        Ok(self.store.hash_exists(&self.key, field)?)
    }

    /// Store `value` under `field`, overwriting any previous value.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.store.hash_set(&self.key, field, encode(&value.into()))?;
        Ok(())
    }

    /// Remove `field`, failing with [`Error::FieldNotFound`] if it is absent.
    pub fn delete(&self, field: &str) -> Result<(), Error> {
        if self.store.hash_delete(&self.key, field)? == 0 {
            return Err(Error::FieldNotFound(field.to_string()));
        }
        Ok(())
    }

    /// Remove `field` and return its value.
    pub fn pop(&self, field: &str) -> Result<Value, Error> {
        let value = self.get(field)?;
        self.delete(field)?;
        Ok(value)
    }

    /// Field names, from a single listing request.
    pub fn fields(&self) -> Result<impl Iterator<Item = String>, Error> {
        Ok(self.store.hash_fields(&self.key)?.into_iter())
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.store.hash_len(&self.key)?)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Field/value pairs.
    ///
    /// Fields removed by another client between the listing and the read
    /// are skipped.
    pub fn items(&self) -> Result<Vec<(String, Value)>, Error> {
        let mut items = Vec::new();
        for field in self.fields()? {
            if let Some(value) = self.get_opt(&field)? {
                items.push((field, value));
            }
        }
        Ok(items)
    }

    pub fn values(&self) -> Result<Vec<Value>, Error> {
        Ok(self.items()?.into_iter().map(|(_, v)| v).collect())
    }

    pub fn to_map(&self) -> Result<BTreeMap<String, Value>, Error> {
        Ok(self.items()?.into_iter().collect())
    }

    pub fn equals(&self, other: &BTreeMap<String, Value>) -> Result<bool, Error> {
        Ok(self.to_map()? == *other)
    }

    /// Set every field in `entries`, leaving other fields alone.
    pub fn update<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>) -> Result<(), Error>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (field, value) in entries {
            self.set(field.as_ref(), value)?;
        }
        Ok(())
    }

    /// Remove every field.
    pub fn clear(&self) -> Result<(), Error> {
        for field in self.fields()? {
            self.store.hash_delete(&self.key, &field)?;
        }
        Ok(())
    }

    /// Replace the whole content with `entries`: a full replace, not a merge.
    pub fn replace_all<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>) -> Result<(), Error>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.clear()?;
        self.update(entries)
    }
}

impl fmt::Debug for MappingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingView")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Shows the current contents, read from the store when formatted.
impl fmt::Display for MappingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_map() {
            Ok(fields) => write!(f, "{}", Value::Map(fields)),
            Err(e) => write!(f, "<{} unavailable: {}>", self.key, e),
        }
    }
}
