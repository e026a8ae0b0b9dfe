//! Two-phase schema synthesis.
//!
//! Phase 1 turns each model's ordered field declarations into storage
//! column descriptors; phase 2 wires one-to-many relationships once every
//! model in the shared namespace is visible. Form field specifications are
//! derived from the same column descriptors afterwards.

mod column;
mod form;
mod model;
mod relation;

pub use column::{ColumnDescriptor, ColumnKind};
pub use form::{Choice, ChoiceProvider, FieldSpec, RecordSource, Validation};
pub use model::{ActionKind, ActionLink, ModelDescriptor};
pub use relation::Relationship;

pub(crate) use column::synthesize_model_columns;
pub(crate) use form::synthesize_form;
pub(crate) use relation::resolve_model_relationships;

use std::fmt;

/// A non-fatal degradation recorded during synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisWarning {
    /// A `_id` integer field whose stripped prefix names no known model;
    /// the column degraded to a plain integer.
    UnmatchedForeignKey {
        /// Owning model key.
        model: String,
        /// Field name carrying the `_id` suffix.
        field: String,
        /// The model key the prefix would have referenced.
        target: String,
    },
}

impl fmt::Display for SynthesisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisWarning::UnmatchedForeignKey {
                model,
                field,
                target,
            } => write!(
                f,
                "field `{}.{}` looks like a foreign key but no model `{}` exists; \
                 synthesized as a plain integer column",
                model, field, target
            ),
        }
    }
}
