//! Form field synthesis.

use super::column::{ColumnDescriptor, ColumnKind};
use crate::types::{ColumnType, WidgetKind};
use bauplan_model::{label, Value};

/// Validation attached to an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Input is required.
    Required,
    /// Input may be left empty.
    Optional,
    /// No validator (boolean fields: an unchecked box is a valid false).
    None,
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Referenced record id.
    pub id: i64,
    /// Display label.
    pub label: String,
}

/// Source of live records backing foreign-key choice fields.
///
/// Implemented by the storage layer; the core never precomputes choices.
pub trait RecordSource {
    /// List the current records of a model as (id, label) choices.
    fn records(&self, model: &str) -> Vec<Choice>;
}

/// Deferred choice population for a foreign-key field.
///
/// Each provider owns an immutable snapshot of its target model key, taken
/// at synthesis time, so several foreign keys synthesized in one pass can
/// never alias each other's targets. Options are produced at render time
/// from live records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceProvider {
    target: String,
}

impl ChoiceProvider {
    /// The referenced model key.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Produce the current options from live records.
    pub fn options(&self, source: &dyn RecordSource) -> Vec<Choice> {
        source.records(&self.target)
    }
}

/// An input-field specification derived from one storage column.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Widget kind to render.
    pub widget: WidgetKind,
    /// Validation behavior.
    pub validation: Validation,
    /// Initial value, if the declaration carried a concrete default.
    pub initial: Option<Value>,
    /// Choice provider for foreign-key fields.
    pub choices: Option<ChoiceProvider>,
}

/// Derive the ordered input-field specifications for one model.
///
/// Field order follows column order (which follows declaration order). The
/// primary key is skipped; collection fields never reach this point because
/// the column synthesizer already filtered them.
pub(crate) fn synthesize_form(columns: &[ColumnDescriptor]) -> Vec<FieldSpec> {
    columns
        .iter()
        .filter(|column| column.kind != ColumnKind::PrimaryKey)
        .map(|column| {
            let (widget, choices) = match &column.kind {
                ColumnKind::ForeignKey { references } => (
                    WidgetKind::Select,
                    Some(ChoiceProvider {
                        target: references.clone(),
                    }),
                ),
                _ => (column.descriptor.widget(), None),
            };

            let validation = if column.column_type() == ColumnType::Boolean {
                Validation::None
            } else if column.default.is_null() {
                Validation::Optional
            } else {
                Validation::Required
            };

            FieldSpec {
                name: column.name.clone(),
                label: label(&column.name),
                widget,
                validation,
                initial: column.default.value().cloned(),
                choices,
            }
        })
        .collect()
}
