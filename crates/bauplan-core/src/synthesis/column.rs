//! Storage column synthesis (phase 1).

use super::SynthesisWarning;
use crate::error::Error;
use crate::types::{BoundDescriptor, ColumnType, TypeRegistry};
use bauplan_model::{FieldDefault, ModelDecl, Primitive};
use std::collections::HashSet;
use tracing::{debug, warn};

/// What kind of storage column a field synthesized into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// The implicit integer primary key.
    PrimaryKey,
    /// A plain data column.
    Plain,
    /// A foreign key referencing another model's primary key.
    ForeignKey {
        /// Referenced model key.
        references: String,
    },
}

/// A synthesized storage column for one field.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Column name (equals the field name).
    pub name: String,
    /// Owning model key.
    pub model: String,
    /// Resolved type descriptor, bound to the field's annotation.
    pub descriptor: BoundDescriptor,
    /// The field's declared default state.
    pub default: FieldDefault,
    /// Column kind.
    pub kind: ColumnKind,
    /// Whether the storage layer should accept null.
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// The target storage type.
    pub fn column_type(&self) -> ColumnType {
        self.descriptor.column_type()
    }

    /// Check if this column is a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ColumnKind::ForeignKey { .. })
    }

    /// The referenced model key for a foreign key.
    pub fn references(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::ForeignKey { references } => Some(references),
            _ => None,
        }
    }
}

/// Synthesize the ordered column list for one model.
///
/// An implicit `id` primary key is prepended; declared fields follow in
/// declaration order. Collection-sentinel fields are filtered out entirely
/// (the relationship resolver picks them up in phase 2). A `_id` integer
/// field whose prefix names a model in `keys` becomes a foreign key;
/// otherwise it degrades to a plain column and a warning is recorded.
pub(crate) fn synthesize_model_columns(
    types: &TypeRegistry,
    keys: &HashSet<String>,
    decl: &ModelDecl,
    warnings: &mut Vec<SynthesisWarning>,
) -> Result<Vec<ColumnDescriptor>, Error> {
    let model = decl.key();
    let mut columns = Vec::with_capacity(decl.fields.len() + 1);

    let id_descriptor = types
        .resolve(&Primitive::Integer.into())
        .map_err(|_| Error::UnresolvableField {
            model: model.clone(),
            field: "id".into(),
            declared: "integer".into(),
        })?;
    columns.push(ColumnDescriptor {
        name: "id".into(),
        model: model.clone(),
        descriptor: id_descriptor,
        default: FieldDefault::Absent,
        kind: ColumnKind::PrimaryKey,
        nullable: false,
    });

    for field in &decl.fields {
        if field.is_collection() {
            continue;
        }

        let descriptor =
            types
                .resolve(&field.declared)
                .map_err(|_| Error::UnresolvableField {
                    model: model.clone(),
                    field: field.name.clone(),
                    declared: field.declared.to_string(),
                })?;

        let kind = match field.foreign_key_target() {
            Some(target) if keys.contains(target) => ColumnKind::ForeignKey {
                references: target.to_string(),
            },
            Some(target) => {
                warn!(
                    model = %model,
                    field = %field.name,
                    target = %target,
                    "foreign-key naming convention matched but target model is unknown"
                );
                warnings.push(SynthesisWarning::UnmatchedForeignKey {
                    model: model.clone(),
                    field: field.name.clone(),
                    target: target.to_string(),
                });
                ColumnKind::Plain
            }
            None => ColumnKind::Plain,
        };

        columns.push(ColumnDescriptor {
            name: field.name.clone(),
            model: model.clone(),
            descriptor,
            default: field.default.clone(),
            kind,
            nullable: field.default.is_null(),
        });
    }

    debug!(model = %model, columns = columns.len(), "synthesized columns");
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bauplan_model::{FieldDecl, Value};

    fn keys(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_order_preserved_with_implicit_id() {
        let decl = ModelDecl::new("Genus")
            .with_field(FieldDecl::required("name", Primitive::Text))
            .with_field(FieldDecl::required("family", Primitive::Text));
        let mut warnings = Vec::new();
        let columns =
            synthesize_model_columns(&TypeRegistry::builtin(), &keys(&["genus"]), &decl, &mut warnings)
                .unwrap();

        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "family"]);
        assert_eq!(columns[0].kind, ColumnKind::PrimaryKey);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_foreign_key_when_target_exists() {
        let decl = ModelDecl::new("Species")
            .with_field(FieldDecl::required("genus_id", Primitive::Integer))
            .with_field(FieldDecl::required("name", Primitive::Text));
        let mut warnings = Vec::new();
        let columns = synthesize_model_columns(
            &TypeRegistry::builtin(),
            &keys(&["genus", "species"]),
            &decl,
            &mut warnings,
        )
        .unwrap();

        let fk = &columns[1];
        assert_eq!(fk.name, "genus_id");
        assert_eq!(fk.references(), Some("genus"));
        assert!(!fk.nullable);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_foreign_key_degrades_with_warning_when_target_missing() {
        let decl = ModelDecl::new("Species")
            .with_field(FieldDecl::required("genus_id", Primitive::Integer));
        let mut warnings = Vec::new();
        let columns = synthesize_model_columns(
            &TypeRegistry::builtin(),
            &keys(&["species"]),
            &decl,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(columns[1].kind, ColumnKind::Plain);
        assert_eq!(columns[1].column_type(), ColumnType::Integer);
        assert_eq!(
            warnings,
            vec![SynthesisWarning::UnmatchedForeignKey {
                model: "species".into(),
                field: "genus_id".into(),
                target: "genus".into(),
            }]
        );
    }

    #[test]
    fn test_text_id_field_is_not_a_foreign_key() {
        let decl = ModelDecl::new("Tag")
            .with_field(FieldDecl::required("genus_id", Primitive::Text));
        let mut warnings = Vec::new();
        let columns = synthesize_model_columns(
            &TypeRegistry::builtin(),
            &keys(&["genus", "tag"]),
            &decl,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(columns[1].kind, ColumnKind::Plain);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_collection_fields_are_filtered_out() {
        let decl = ModelDecl::new("Genus")
            .with_field(FieldDecl::required("name", Primitive::Text))
            .with_field(FieldDecl::collection("species"));
        let mut warnings = Vec::new();
        let columns = synthesize_model_columns(
            &TypeRegistry::builtin(),
            &keys(&["genus", "species"]),
            &decl,
            &mut warnings,
        )
        .unwrap();

        assert!(columns.iter().all(|c| c.name != "species"));
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_nullability_follows_default_rule() {
        let decl = ModelDecl::new("Note")
            .with_field(FieldDecl::required("title", Primitive::Text))
            .with_field(FieldDecl::optional("body", Primitive::Text))
            .with_field(FieldDecl::with_default("priority", Primitive::Integer, Value::Int(1)));
        let mut warnings = Vec::new();
        let columns = synthesize_model_columns(
            &TypeRegistry::builtin(),
            &keys(&["note"]),
            &decl,
            &mut warnings,
        )
        .unwrap();

        assert!(!columns[1].nullable); // required, no default
        assert!(columns[2].nullable); // explicit null default
        assert!(!columns[3].nullable); // concrete default
    }

    #[test]
    fn test_unresolvable_type_aborts_model() {
        let decl = ModelDecl::new("Genus")
            .with_field(FieldDecl::required("name", Primitive::Text));
        let mut warnings = Vec::new();
        let err = synthesize_model_columns(
            &TypeRegistry::empty(),
            &keys(&["genus"]),
            &decl,
            &mut warnings,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvableField { .. }));
    }
}
