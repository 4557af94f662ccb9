//! Sequence view: a remote list presented as an indexable, sliceable sequence.
//!
//! The store only offers index get/set, pushes and pops at both ends, a
//! length query, contiguous range reads and trim-to-range. Everything else
//! a sequence needs (middle insertion and deletion, slice assignment that
//! grows or shrinks the list) is emulated here:
//!
//! - removing or inserting at either end is a single pop/push
//! - removing or inserting in the middle reads the tail, trims the list to
//!   just before the target position and re-appends the tail, so the cost
//!   is proportional to the tail length
//!
//! These emulations span several commands and are not atomic. Another
//! client reading the key in between can observe the list trimmed but not
//! yet re-extended.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use remotemap_codec::{decode, encode, Value};
use remotemap_kv_store::KvStore;

use crate::{Error, Slice};

/// A remote list viewed as a sequence of [`Value`]s.
///
/// The view holds no data: every call reads or writes the store.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use remotemap_core::{RemoteMap, Slice, Value};
/// use remotemap_memory_store::MemoryStore;
///
/// let map = RemoteMap::new(Arc::new(MemoryStore::new()), "doc");
/// map.set("f", vec![0i64, 1, 2, 3, 4]).unwrap();
///
/// let seq = map.get("f").unwrap().into_sequence().unwrap();
/// assert_eq!(seq.get(-1).unwrap(), Value::from(4i64));
///
/// seq.set_slice(1..3, ["a", "b"]).unwrap();
/// assert_eq!(seq.get_slice(..).unwrap().len(), 5);
/// ```
#[derive(Clone)]
pub struct SequenceView {
    key: String,
    store: Arc<dyn KvStore>,
}

impl SequenceView {
    /// Bind a view to the list at physical `key`.
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

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.store.list_len(&self.key)?)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Read the element at `index`. Negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<Value, Error> {
        let len = self.len()?;
        let i = normalize(index, len)?;
        self.store
            .list_get(&self.key, i)?
            .map(|raw| decode(&raw))
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Read the elements covered by `slice`.
    pub fn get_slice(&self, slice: impl Into<Slice>) -> Result<Vec<Value>, Error> {
        let indices = slice.into().indices(self.len()?)?;
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        // Contiguous slices come back in one range read.
        if indices.step == 1 {
            let raw = self
                .store
                .list_range(&self.key, indices.start, indices.stop - 1)?;
            return Ok(raw.iter().map(|r| decode(r)).collect());
        }

        indices
            .iter()
            .map(|i| {
                self.store
                    .list_get(&self.key, i)?
                    .map(|raw| decode(&raw))
                    .ok_or(Error::IndexOutOfRange {
                        index: i,
                        len: indices.len(),
                    })
            })
            .collect()
    }

    /// Overwrite the element at `index`.
    pub fn set(&self, index: i64, value: impl Into<Value>) -> Result<(), Error> {
        let i = normalize(index, self.len()?)?;
        self.store.list_set(&self.key, i, encode(&value.into()))?;
        Ok(())
    }

    /// Assign `values` to the elements covered by `slice`.
    ///
    /// With a step of 1 the number of values may differ from the slice
    /// length: surplus slice elements are removed, surplus values are
    /// inserted after the last covered position. With any other step the
    /// counts must match exactly; a mismatch fails with
    /// [`Error::ValueMismatch`] before anything is written.
    pub fn set_slice<V: Into<Value>>(
        &self,
        slice: impl Into<Slice>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), Error> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let indices = slice.into().indices(self.len()?)?;

        if indices.step != 1 {
            let expected = indices.len();
            if values.len() != expected {
                return Err(Error::ValueMismatch {
                    expected,
                    actual: values.len(),
                });
            }
            for (i, value) in indices.iter().zip(&values) {
                self.store.list_set(&self.key, i, encode(value))?;
            }
            return Ok(());
        }

        let stop = indices.stop.max(indices.start);
        let mut values = values.into_iter();
        let mut i = indices.start;
        while i < stop {
            match values.next() {
                Some(value) => {
                    self.store.list_set(&self.key, i, encode(&value))?;
                    i += 1;
                }
                None => return self.delete_slice(Slice::new(i, stop)),
            }
        }

        let rest: Vec<Value> = values.collect();
        if !rest.is_empty() {
            self.insert_all(i, rest)?;
        }
        Ok(())
    }

    /// Remove the element at `index`.
    pub fn delete(&self, index: i64) -> Result<(), Error> {
        self.pop(index).map(|_| ())
    }

    /// Remove every element covered by `slice`.
    ///
    /// Elements are removed from the highest index down so earlier removals
    /// never shift the positions of later ones.
    pub fn delete_slice(&self, slice: impl Into<Slice>) -> Result<(), Error> {
        let mut targets: Vec<i64> = slice.into().indices(self.len()?)?.iter().collect();
        targets.sort_unstable_by(|a, b| b.cmp(a));
        for i in targets {
            self.delete(i)?;
        }
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn pop(&self, index: i64) -> Result<Value, Error> {
        let len = self.len()?;
        let i = normalize(index, len)?;

        let removed = if i == 0 {
            self.store.list_pop_left(&self.key)?
        } else if i == len as i64 - 1 {
            self.store.list_pop_right(&self.key)?
        } else {
            let mut tail = self.store.list_range(&self.key, i, -1)?.into_iter();
            let removed = tail.next();
            self.rewrite_tail(i, Vec::new(), tail)?;
            removed
        };

        removed
            .map(|raw| decode(&raw))
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Insert `value` before position `index`.
    ///
    /// Indices past the end append; negative indices count from the end and
    /// clamp to the front.
    pub fn insert(&self, index: i64, value: impl Into<Value>) -> Result<(), Error> {
        self.insert_all(index, vec![value.into()])
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<(), Error> {
        self.store.list_push_right(&self.key, encode(&value.into()))?;
        Ok(())
    }

    pub fn extend<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Result<(), Error> {
        for value in values {
            self.append(value)?;
        }
        Ok(())
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &Value) -> Result<bool, Error> {
        Ok(self.position(value)?.is_some())
    }

    /// Index of the first element equal to `value`.
    pub fn position(&self, value: &Value) -> Result<Option<usize>, Error> {
        for (i, item) in self.iter().enumerate() {
            if item? == *value {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Number of elements equal to `value`.
    pub fn count_of(&self, value: &Value) -> Result<usize, Error> {
        Ok(self.to_vec()?.iter().filter(|v| *v == value).count())
    }

    /// Remove the first element equal to `value`.
    pub fn remove(&self, value: &Value) -> Result<(), Error> {
        match self.position(value)? {
            Some(i) => self.delete(i as i64),
            None => Err(Error::ValueNotFound(value.clone())),
        }
    }

    /// Remove every element.
    pub fn clear(&self) -> Result<(), Error> {
        // An empty trim range drops the list entirely.
        self.store.list_trim(&self.key, 1, 0)?;
        Ok(())
    }

    /// Reverse the elements in place.
    pub fn reverse(&self) -> Result<(), Error> {
        let raw = self.store.list_range(&self.key, 0, -1)?;
        for (i, item) in raw.into_iter().rev().enumerate() {
            self.store.list_set(&self.key, i as i64, item)?;
        }
        Ok(())
    }

    /// Replace the whole content with `values`.
    pub fn replace_all<V: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), Error> {
        self.set_slice(Slice::full(), values)
    }

    pub fn first(&self) -> Result<Option<Value>, Error> {
        Ok(self.store.list_get(&self.key, 0)?.map(|raw| decode(&raw)))
    }

    pub fn last(&self) -> Result<Option<Value>, Error> {
        Ok(self.store.list_get(&self.key, -1)?.map(|raw| decode(&raw)))
    }

    /// Read every element in one range request.
    pub fn to_vec(&self) -> Result<Vec<Value>, Error> {
        let raw = self.store.list_range(&self.key, 0, -1)?;
        Ok(raw.iter().map(|r| decode(r)).collect())
    }

    /// Element-wise equality with a local sequence.
    pub fn equals(&self, other: &[Value]) -> Result<bool, Error> {
        Ok(self.to_vec()? == other)
    }

    /// Iterate lazily, one index read per element.
    ///
    /// Iteration stops at the first index the list no longer has, so a
    /// list shrinking underneath the iterator ends it early rather than
    /// failing.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            view: self,
            index: 0,
            done: false,
        }
    }

    /// Insert `values` in order, starting before position `index`.
    fn insert_all(&self, index: i64, values: Vec<Value>) -> Result<(), Error> {
        let len = self.len()? as i64;
        let index = if index < 0 { (index + len).max(0) } else { index };
        let encoded = values.iter().map(encode);

        if index >= len {
            for item in encoded {
                self.store.list_push_right(&self.key, item)?;
            }
        } else if index == 0 {
            for item in encoded.rev() {
                self.store.list_push_left(&self.key, item)?;
            }
        } else {
            let tail = self.store.list_range(&self.key, index, -1)?;
            self.rewrite_tail(index, encoded.collect(), tail)?;
        }
        Ok(())
    }

    /// Cut the list down to `..at`, then push `insert` followed by `tail`.
    fn rewrite_tail(
        &self,
        at: i64,
        insert: Vec<Bytes>,
        tail: impl IntoIterator<Item = Bytes>,
    ) -> Result<(), Error> {
        log::trace!("rewriting {} from index {}", self.key, at);
        self.store.list_trim(&self.key, 0, at - 1)?;
        for item in insert.into_iter().chain(tail) {
            self.store.list_push_right(&self.key, item)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SequenceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceView")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Shows the current contents, read from the store when formatted.
impl fmt::Display for SequenceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_vec() {
            Ok(items) => write!(f, "{}", Value::Array(items)),
            Err(e) => write!(f, "<{} unavailable: {}>", self.key, e),
        }
    }
}

impl<'a> IntoIterator for &'a SequenceView {
    type Item = Result<Value, Error>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy element iterator returned by [`SequenceView::iter`].
pub struct Iter<'a> {
    view: &'a SequenceView,
    index: i64,
    done: bool,
}

impl Iterator for Iter<'_> {
    type Item = Result<Value, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.view.store.list_get(&self.view.key, self.index) {
            Ok(Some(raw)) => {
                self.index += 1;
                Some(Ok(decode(&raw)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Resolve `index` against `len`, failing if it falls outside `[0, len)`.
fn normalize(index: i64, len: usize) -> Result<i64, Error> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(resolved)
}
