//! Synthesized per-model metadata.

use super::column::{ColumnDescriptor, ColumnKind};
use super::form::FieldSpec;
use super::relation::Relationship;
use bauplan_model::label;

/// The standard self-referencing actions every model exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Read one record.
    Read,
    /// Update one record.
    Update,
    /// Delete one record.
    Delete,
}

impl ActionKind {
    fn path_segment(self) -> &'static str {
        match self {
            ActionKind::Read => "read",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ActionKind::Read => "bi bi-zoom-in",
            ActionKind::Update => "bi bi-pencil",
            ActionKind::Delete => "bi bi-x-circle",
        }
    }
}

/// A self-referencing action link template.
///
/// Parameterized only by the model's prefix and key; the `{id}` placeholder
/// is filled per record by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    /// Which action this link performs.
    pub kind: ActionKind,
    /// Url template containing an `{id}` placeholder.
    pub template: String,
    /// Display icon name.
    pub icon: String,
}

impl ActionLink {
    /// Fill the `{id}` placeholder for one record.
    pub fn instantiate(&self, id: i64) -> String {
        self.template.replace("{id}", &id.to_string())
    }
}

/// Immutable synthesized metadata for one model.
///
/// Created once during startup synthesis and shared read-only across all
/// requests afterwards; every derived list below is computed once and
/// cached here.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Declared CamelCase name.
    pub name: String,
    /// Namespace key and storage table name.
    pub key: String,
    /// Owning group name.
    pub group: String,
    /// Url prefix of the owning group.
    pub prefix: String,
    columns: Vec<ColumnDescriptor>,
    relationships: Vec<Relationship>,
    form: Vec<FieldSpec>,
    raw_attributes: Vec<String>,
    attributes: Vec<String>,
    headers: Vec<String>,
    actions: Vec<ActionLink>,
}

impl ModelDescriptor {
    pub(crate) fn new(
        name: String,
        key: String,
        group: String,
        prefix: String,
        columns: Vec<ColumnDescriptor>,
        relationships: Vec<Relationship>,
        form: Vec<FieldSpec>,
    ) -> Self {
        let mut raw_attributes: Vec<String> = columns
            .iter()
            .filter(|c| c.kind != ColumnKind::PrimaryKey)
            .map(|c| c.name.clone())
            .collect();
        raw_attributes.extend(relationships.iter().map(Relationship::list_attribute));

        let attributes: Vec<String> = raw_attributes
            .iter()
            .map(|a| a.strip_suffix("_id").unwrap_or(a).to_string())
            .collect();

        let headers: Vec<String> = attributes.iter().map(|a| label(a)).collect();

        let actions = [ActionKind::Read, ActionKind::Update, ActionKind::Delete]
            .into_iter()
            .map(|kind| ActionLink {
                kind,
                template: format!("{}/{}/{}/{{id}}", prefix, key, kind.path_segment()),
                icon: kind.icon().to_string(),
            })
            .collect();

        Self {
            name,
            key,
            group,
            prefix,
            columns,
            relationships,
            form,
            raw_attributes,
            attributes,
            headers,
            actions,
        }
    }

    /// The ordered storage columns, implicit primary key first.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// One-to-many relationships this model is the parent of.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// The ordered input-field specifications.
    pub fn form(&self) -> &[FieldSpec] {
        &self.form
    }

    /// Raw storage attribute names plus relationship list attributes.
    pub fn raw_attributes(&self) -> &[String] {
        &self.raw_attributes
    }

    /// UI-facing attribute names (foreign-key suffix stripped).
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Capitalized display headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The standard read/update/delete action-link templates.
    pub fn actions(&self) -> &[ActionLink] {
        &self.actions
    }
}
