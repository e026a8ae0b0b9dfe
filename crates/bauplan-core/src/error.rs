//! Core error types.

use thiserror::Error;

/// Synthesis and conversion errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No descriptor registered for a declared type.
    #[error("no type descriptor registered for `{declared}`")]
    UnknownType {
        /// Display form of the declared type.
        declared: String,
    },

    /// A field's declared type could not be resolved at synthesis time.
    #[error("cannot synthesize `{model}.{field}`: no type descriptor for `{declared}`")]
    UnresolvableField {
        /// Owning model key.
        model: String,
        /// Field name.
        field: String,
        /// Display form of the declared type.
        declared: String,
    },

    /// The same model key was declared in two groups.
    #[error("duplicate model `{key}` declared in groups `{first}` and `{second}`")]
    DuplicateModel {
        /// Conflicting model key.
        key: String,
        /// Group that declared the key first.
        first: String,
        /// Group that declared it again.
        second: String,
    },

    /// A collection field references a model absent from the namespace.
    #[error("collection field `{model}.{field}` references unknown model `{target}`")]
    MissingRelationTarget {
        /// Parent model key.
        model: String,
        /// Collection field name.
        field: String,
        /// Missing child model key.
        target: String,
    },

    /// The child side of a one-to-many lacks the backing foreign key.
    #[error("model `{child}` has no foreign key `{field}` backing the collection on `{parent}`")]
    MissingBackReference {
        /// Parent model key.
        parent: String,
        /// Child model key.
        child: String,
        /// Expected foreign-key column name on the child.
        field: String,
    },

    /// Registration attempted after the namespace was frozen.
    #[error("namespace is frozen; models cannot be registered after synthesis")]
    FrozenNamespace,

    /// A conversion transform received an incompatible or malformed value.
    #[error("invalid value for conversion: {0}")]
    InvalidValue(String),

    /// A file value had no content bytes left to persist.
    #[error("file `{0}` has no content to persist")]
    MissingFileContent(String),

    /// File storage write failed.
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),
}
