//! Declared field types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Primitive field types a model may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// Boolean value.
    Bool,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// UTF-8 text.
    Text,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time of day.
    DateTime,
    /// Uploaded file (name plus content bytes).
    File,
    /// Arbitrary JSON document.
    Json,
}

/// The declared type of a field.
///
/// A declaration is either a bare primitive, a primitive annotated with
/// string-keyed metadata (e.g. a storage-location hint for file fields), or
/// the collection sentinel marking a one-to-many relationship instead of a
/// stored column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclaredType {
    /// A bare primitive.
    Primitive(Primitive),
    /// A primitive carrying string-keyed metadata.
    Annotated {
        /// The wrapped base type.
        base: Primitive,
        /// Arbitrary metadata attached to the declaration.
        metadata: BTreeMap<String, String>,
    },
    /// One-to-many sentinel: the field is a relationship, not a column.
    Collection,
}

impl DeclaredType {
    /// Create an annotated declaration from key/value metadata pairs.
    pub fn annotated(
        base: Primitive,
        metadata: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        DeclaredType::Annotated {
            base,
            metadata: metadata
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the base primitive, unwrapping an annotation.
    ///
    /// Returns `None` for the collection sentinel.
    pub fn base(&self) -> Option<Primitive> {
        match self {
            DeclaredType::Primitive(p) => Some(*p),
            DeclaredType::Annotated { base, .. } => Some(*base),
            DeclaredType::Collection => None,
        }
    }

    /// Check if this is the one-to-many collection sentinel.
    pub fn is_collection(&self) -> bool {
        matches!(self, DeclaredType::Collection)
    }

    /// Look up an annotation metadata value by key.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        match self {
            DeclaredType::Annotated { metadata, .. } => metadata.get(key).map(String::as_str),
            _ => None,
        }
    }
}

impl From<Primitive> for DeclaredType {
    fn from(p: Primitive) -> Self {
        DeclaredType::Primitive(p)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Bool => "bool",
            Primitive::Integer => "integer",
            Primitive::Float => "float",
            Primitive::Text => "text",
            Primitive::Date => "date",
            Primitive::Time => "time",
            Primitive::DateTime => "datetime",
            Primitive::File => "file",
            Primitive::Json => "json",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Primitive(p) => write!(f, "{}", p),
            DeclaredType::Annotated { base, .. } => write!(f, "annotated {}", base),
            DeclaredType::Collection => f.write_str("collection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_unwraps_annotation() {
        let plain = DeclaredType::Primitive(Primitive::Integer);
        assert_eq!(plain.base(), Some(Primitive::Integer));

        let annotated = DeclaredType::annotated(Primitive::File, [("storage_location", "species")]);
        assert_eq!(annotated.base(), Some(Primitive::File));
        assert_eq!(annotated.metadata("storage_location"), Some("species"));
        assert_eq!(annotated.metadata("missing"), None);
    }

    #[test]
    fn test_collection_sentinel() {
        let sentinel = DeclaredType::Collection;
        assert!(sentinel.is_collection());
        assert_eq!(sentinel.base(), None);
        assert_eq!(sentinel.metadata("anything"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DeclaredType::from(Primitive::Text).to_string(), "text");
        assert_eq!(DeclaredType::Collection.to_string(), "collection");
        assert_eq!(
            DeclaredType::annotated(Primitive::File, [("storage_location", "x")]).to_string(),
            "annotated file"
        );
    }
}
