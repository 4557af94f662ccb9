//! Error types for the store layer.
//!
//! Errors at this level describe what the remote store (or the transport to
//! it) reported. Collection-level errors like "key not found" or "index out
//! of range for this view" belong in higher layers.

use crate::Shape;

/// Errors reported by a [`KvStore`](crate::KvStore) implementation.
#[derive(Debug)]
pub enum StoreError {
    /// Generic I/O or transport failure.
    ///
    /// Use this for network errors, protocol errors, connection loss, etc.
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// A primitive was applied to a key holding a different shape.
    WrongType {
        key: String,
        expected: Shape,
        found: Shape,
    },

    /// An index-addressed list primitive was given an index outside the list.
    IndexOutOfRange { key: String, index: i64 },

    /// The store holds a value kind with no matching shape (sorted sets,
    /// streams, ...).
    UnsupportedShape(String),
}

impl StoreError {
    /// Wrap any error as a transport failure.
    pub fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Transport(Box::new(e))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Transport(e) => write!(f, "transport error: {}", e),
            StoreError::WrongType {
                key,
                expected,
                found,
            } => write!(
                f,
                "wrong type for key '{}': expected {}, found {}",
                key, expected, found
            ),
            StoreError::IndexOutOfRange { key, index } => {
                write!(f, "index {} out of range for list '{}'", index, key)
            }
            StoreError::UnsupportedShape(name) => {
                write!(f, "unsupported value type: {}", name)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Transport(Box::new(e))
    }
}
