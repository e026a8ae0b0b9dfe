//! One-to-many relationship resolution (phase 2).

use super::column::ColumnDescriptor;
use crate::error::Error;
use bauplan_model::{snake_to_camel, ModelDecl};
use std::collections::HashMap;
use tracing::debug;

/// An inferred one-to-many link between a parent and a child model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Parent model key (the "one" side).
    pub parent: String,
    /// The collection field that declared the relationship.
    pub field: String,
    /// Child model key (the "many" side, named by the field).
    pub child: String,
    /// Child model's declared CamelCase name.
    pub child_model: String,
    /// Back-reference name on the child side: the parent model key.
    pub back_reference: String,
}

impl Relationship {
    /// The derived list-attribute name exposed on the parent.
    pub fn list_attribute(&self) -> String {
        format!("{}_list", self.field)
    }

    /// The foreign-key column on the child that backs this relationship.
    pub fn child_foreign_key(&self) -> String {
        format!("{}_id", self.parent)
    }
}

/// Resolve the relationships declared by one parent model.
///
/// Must run only after phase 1 has synthesized columns for every model, so
/// forward references across groups resolve. Both naming-convention sides
/// are validated: the child model must exist, and it must carry a foreign
/// key back to the parent.
pub(crate) fn resolve_model_relationships(
    parent: &ModelDecl,
    columns_by_model: &HashMap<String, Vec<ColumnDescriptor>>,
) -> Result<Vec<Relationship>, Error> {
    let parent_key = parent.key();
    let mut relationships = Vec::new();

    for field in parent.fields.iter().filter(|f| f.is_collection()) {
        let child = field.name.clone();
        let child_columns =
            columns_by_model
                .get(&child)
                .ok_or_else(|| Error::MissingRelationTarget {
                    model: parent_key.clone(),
                    field: field.name.clone(),
                    target: child.clone(),
                })?;

        let expected_fk = format!("{}_id", parent_key);
        let backed = child_columns
            .iter()
            .any(|c| c.name == expected_fk && c.references() == Some(parent_key.as_str()));
        if !backed {
            return Err(Error::MissingBackReference {
                parent: parent_key.clone(),
                child,
                field: expected_fk,
            });
        }

        debug!(parent = %parent_key, child = %child, "resolved one-to-many relationship");
        relationships.push(Relationship {
            parent: parent_key.clone(),
            field: field.name.clone(),
            child_model: snake_to_camel(&child),
            child,
            back_reference: parent_key.clone(),
        });
    }

    Ok(relationships)
}
