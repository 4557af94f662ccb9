//! Error types for the view layer.

use remotemap_codec::Value;
use remotemap_kv_store::StoreError;

/// Errors surfaced by [`RemoteMap`](crate::RemoteMap) and the typed views.
///
/// Lookup errors (`KeyNotFound`, `FieldNotFound`, ...) are never recovered
/// internally. Store failures are passed through untouched in
/// [`Error::Store`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("value not found: {0}")]
    ValueNotFound(Value),

    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("attempt to assign {actual} values to extended slice of size {expected}")]
    ValueMismatch { expected: usize, actual: usize },

    #[error("invalid slice: {message}")]
    InvalidSlice { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Whether this is one of the "no such key/field/value" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound(_)
                | Error::FieldNotFound(_)
                | Error::ValueNotFound(_)
                | Error::AttributeNotFound(_)
        )
    }
}
