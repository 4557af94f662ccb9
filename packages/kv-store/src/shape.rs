//! The shape tag a remote store reports for a key.

use std::fmt;
use std::str::FromStr;

use crate::StoreError;

/// The declared value kind of a stored key.
///
/// This is what drives which view the root mapping hands out for a key.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shape {
    /// A single opaque byte string.
    Scalar,
    /// An ordered list of byte strings.
    Sequence,
    /// A field -> byte string hash.
    Mapping,
    /// An unordered set of unique byte strings.
    Set,
}

impl Shape {
    /// The name the remote store uses for this shape in its type query.
    pub fn store_name(&self) -> &'static str {
        match self {
            Shape::Scalar => "string",
            Shape::Sequence => "list",
            Shape::Mapping => "hash",
            Shape::Set => "set",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Scalar => "scalar",
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
            Shape::Set => "set",
        };
        f.write_str(name)
    }
}

impl FromStr for Shape {
    type Err = StoreError;

    /// Parse a remote type name (`string`, `list`, `hash`, `set`).
    ///
    /// `none` is not a shape; callers translate it to "absent" before
    /// parsing. Any other name (sorted sets, streams, ...) is unsupported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Shape::Scalar),
            "list" => Ok(Shape::Sequence),
            "hash" => Ok(Shape::Mapping),
            "set" => Ok(Shape::Set),
            other => Err(StoreError::UnsupportedShape(other.to_string())),
        }
    }
}
