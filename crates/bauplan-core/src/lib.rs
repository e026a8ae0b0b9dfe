//! Schema synthesis engine for declaratively defined data models.
//!
//! Applications describe their data as plain field declarations grouped
//! into model groups; this crate synthesizes everything else at startup:
//! storage columns with an implicit primary key, naming-convention foreign
//! keys and one-to-many relationships, input-form specifications, display
//! metadata, and per-field value-conversion pipelines.
//!
//! The entry point is [`ModelRegistry`]: feed it groups and call
//! [`ModelRegistry::synthesize`] to obtain a frozen [`Namespace`].

pub mod config;
pub mod convert;
pub mod error;
pub mod registry;
pub mod synthesis;
pub mod types;

pub use config::MediaConfig;
pub use convert::{ConvertCx, Seed, ValueBundle};
pub use error::Error;
pub use registry::{ModelRegistry, Namespace};
pub use synthesis::{
    ActionKind, ActionLink, Choice, ChoiceProvider, ColumnDescriptor, ColumnKind, FieldSpec,
    ModelDescriptor, RecordSource, Relationship, SynthesisWarning, Validation,
};
pub use types::{BoundDescriptor, ColumnType, Transform, TypeDescriptor, TypeRegistry, WidgetKind};

/// Re-export of the declaration contract crate.
pub use bauplan_model as model;
