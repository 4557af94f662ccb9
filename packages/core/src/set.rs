//! Set view: a remote set presented as an unordered collection of unique values.
//!
//! Set algebra (subset, union, ...) is computed locally over the
//! materialized membership. Members are compared by their encoded form,
//! which is exactly how the store itself decides whether two members are
//! the same.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use remotemap_codec::{decode, encode, Value};
use remotemap_kv_store::KvStore;

use crate::Error;

#[derive(Clone)]
pub struct SetView {
    key: String,
    store: Arc<dyn KvStore>,
}

impl SetView {
    /// Bind a view to the set at physical `key`.
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

    pub fn contains(&self, value: &Value) -> Result<bool, Error> {
        Ok(self.store.set_contains(&self.key, &encode(value))?)
    }

    /// Members, decoded lazily from a single membership request.
    pub fn iter(&self) -> Result<impl Iterator<Item = Value>, Error> {
        Ok(self.raw_members()?.into_iter().map(|raw| decode(&raw)))
    }

    pub fn to_vec(&self) -> Result<Vec<Value>, Error> {
        Ok(self.iter()?.collect())
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.store.set_len(&self.key)?)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Remove and return an arbitrary member, or `None` if the set is empty.
    pub fn pop(&self) -> Result<Option<Value>, Error> {
        Ok(self.store.set_pop(&self.key)?.map(|raw| decode(&raw)))
    }

    /// Add `value`. Adding an existing member changes nothing.
    pub fn add(&self, value: impl Into<Value>) -> Result<(), Error> {
        self.store.set_add(&self.key, encode(&value.into()))?;
        Ok(())
    }

    /// Remove `value` if present.
    pub fn discard(&self, value: &Value) -> Result<(), Error> {
        self.store.set_remove(&self.key, &encode(value))?;
        Ok(())
    }

    /// Remove `value`, failing with [`Error::ValueNotFound`] if it is absent.
    pub fn remove(&self, value: &Value) -> Result<(), Error> {
        if !self.store.set_remove(&self.key, &encode(value))? {
            return Err(Error::ValueNotFound(value.clone()));
        }
        Ok(())
    }

    /// Remove every member.
    pub fn clear(&self) -> Result<(), Error> {
        for member in self.raw_members()? {
            self.store.set_remove(&self.key, &member)?;
        }
        Ok(())
    }

    /// Replace the whole membership with `values`.
    pub fn replace_all<V: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), Error> {
        self.clear()?;
        for value in values {
            self.add(value)?;
        }
        Ok(())
    }

    // === Set algebra ===

    /// Every member of this set is in `other`.
    pub fn is_subset(&self, other: &[Value]) -> Result<bool, Error> {
        let other = encoded(other);
        Ok(self.member_set()?.is_subset(&other))
    }

    /// Subset of `other` and not equal to it.
    pub fn is_proper_subset(&self, other: &[Value]) -> Result<bool, Error> {
        let other = encoded(other);
        let members = self.member_set()?;
        Ok(members.len() < other.len() && members.is_subset(&other))
    }

    pub fn is_superset(&self, other: &[Value]) -> Result<bool, Error> {
        let other = encoded(other);
        Ok(self.member_set()?.is_superset(&other))
    }

    pub fn is_disjoint(&self, other: &[Value]) -> Result<bool, Error> {
        let other = encoded(other);
        Ok(self.member_set()?.is_disjoint(&other))
    }

    /// Same membership as `other`, ignoring order and duplicates.
    pub fn set_equals(&self, other: &[Value]) -> Result<bool, Error> {
        Ok(self.member_set()? == encoded(other))
    }

    pub fn union(&self, other: &[Value]) -> Result<Vec<Value>, Error> {
        let other = encoded(other);
        Ok(decoded(self.member_set()?.union(&other)))
    }

    pub fn intersection(&self, other: &[Value]) -> Result<Vec<Value>, Error> {
        let other = encoded(other);
        Ok(decoded(self.member_set()?.intersection(&other)))
    }

    /// Members of this set that are not in `other`.
    pub fn difference(&self, other: &[Value]) -> Result<Vec<Value>, Error> {
        let other = encoded(other);
        Ok(decoded(self.member_set()?.difference(&other)))
    }

    /// Members in exactly one of this set and `other`.
    pub fn symmetric_difference(&self, other: &[Value]) -> Result<Vec<Value>, Error> {
        let other = encoded(other);
        Ok(decoded(self.member_set()?.symmetric_difference(&other)))
    }

    fn raw_members(&self) -> Result<Vec<Bytes>, Error> {
        Ok(self.store.set_members(&self.key)?)
    }

    fn member_set(&self) -> Result<BTreeSet<Bytes>, Error> {
        Ok(self.raw_members()?.into_iter().collect())
    }
}

fn encoded(values: &[Value]) -> BTreeSet<Bytes> {
    values.iter().map(encode).collect()
}

fn decoded<'a>(members: impl Iterator<Item = &'a Bytes>) -> Vec<Value> {
    members.map(|raw| decode(raw)).collect()
}

impl fmt::Debug for SetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetView")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Shows the current members, read from the store when formatted.
impl fmt::Display for SetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.member_set() {
            Ok(members) => write!(f, "{}", Value::Set(decoded(members.iter()))),
            Err(e) => write!(f, "<{} unavailable: {}>", self.key, e),
        }
    }
}
