//! Model registry and shared namespace orchestration.
//!
//! Synthesis runs once at startup, single-threaded: the registry enumerates
//! declared models per group in source order, synthesizes columns for every
//! model (phase 1), wires relationships against the full namespace
//! (phase 2), derives form and display metadata, and freezes the result.
//! The frozen [`Namespace`] is immutable and safe for unsynchronized
//! concurrent reads.

use crate::config::MediaConfig;
use crate::convert::ValueBundle;
use crate::error::Error;
use crate::synthesis::{
    resolve_model_relationships, synthesize_form, synthesize_model_columns, ColumnDescriptor,
    ModelDescriptor, SynthesisWarning,
};
use crate::types::TypeRegistry;
use bauplan_model::ModelGroup;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// The shared registry of synthesized models across all groups.
///
/// Insertion order is declaration order; lookups go by model key. After
/// synthesis the namespace is frozen and further registration is rejected.
#[derive(Debug)]
pub struct Namespace {
    media: MediaConfig,
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
    warnings: Vec<SynthesisWarning>,
    frozen: bool,
}

impl Namespace {
    fn empty(media: MediaConfig) -> Self {
        Self {
            media,
            models: Vec::new(),
            index: HashMap::new(),
            warnings: Vec::new(),
            frozen: false,
        }
    }

    pub(crate) fn register(&mut self, model: ModelDescriptor) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::FrozenNamespace);
        }
        if let Some(&existing) = self.index.get(&model.key) {
            return Err(Error::DuplicateModel {
                key: model.key.clone(),
                first: self.models[existing].group.clone(),
                second: model.group,
            });
        }
        self.index.insert(model.key.clone(), self.models.len());
        self.models.push(model);
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Check whether the namespace has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Check if a model key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Get a model by key.
    pub fn get(&self, key: &str) -> Option<&ModelDescriptor> {
        self.index.get(key).map(|&i| &self.models[i])
    }

    /// Iterate models in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Model keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.key.as_str())
    }

    /// Number of synthesized models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Non-fatal degradations recorded during synthesis.
    pub fn warnings(&self) -> &[SynthesisWarning] {
        &self.warnings
    }

    /// The media configuration conversions run against.
    pub fn media(&self) -> &MediaConfig {
        &self.media
    }

    /// Create a conversion bundle for one field of one model.
    ///
    /// Returns `None` if the model or field is unknown.
    pub fn bundle(&self, model: &str, field: &str) -> Option<ValueBundle> {
        let column = self.get(model)?.get_column(field)?;
        Some(ValueBundle::new(
            column.descriptor.clone(),
            self.media.clone(),
        ))
    }
}

/// Orchestrates two-phase synthesis over declared model groups.
pub struct ModelRegistry {
    types: TypeRegistry,
    media: MediaConfig,
    groups: Vec<ModelGroup>,
}

impl ModelRegistry {
    /// Create a registry with the given type registry and media config.
    pub fn new(types: TypeRegistry, media: MediaConfig) -> Self {
        Self {
            types,
            media,
            groups: Vec::new(),
        }
    }

    /// Add a model group, preserving declaration order.
    pub fn with_group(mut self, group: ModelGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a model group in place.
    pub fn add_group(&mut self, group: ModelGroup) {
        self.groups.push(group);
    }

    /// Run the full synthesis pass and return the frozen namespace.
    ///
    /// Fatal errors (unresolvable types, duplicate models, missing or
    /// unbacked relationship targets) abort startup; degraded foreign keys
    /// are recorded as warnings on the namespace.
    pub fn synthesize(self) -> Result<Namespace, Error> {
        // Collect every declared model across groups so phase 1 resolves
        // forward and cross-group references; duplicates fail here.
        let mut keys: HashSet<String> = HashSet::new();
        let mut seen_group: HashMap<String, String> = HashMap::new();
        for group in &self.groups {
            for model in &group.models {
                let key = model.key();
                if let Some(first) = seen_group.get(&key) {
                    return Err(Error::DuplicateModel {
                        key,
                        first: first.clone(),
                        second: group.name.clone(),
                    });
                }
                seen_group.insert(key.clone(), group.name.clone());
                keys.insert(key);
            }
        }

        // Phase 1: storage columns per model, in declaration order.
        let mut warnings = Vec::new();
        let mut columns_by_model: HashMap<String, Vec<ColumnDescriptor>> = HashMap::new();
        for group in &self.groups {
            for model in &group.models {
                let columns =
                    synthesize_model_columns(&self.types, &keys, model, &mut warnings)?;
                columns_by_model.insert(model.key(), columns);
            }
        }

        // Phase 2: relationships, now that every model's columns exist.
        let mut namespace = Namespace::empty(self.media);
        let mut relationship_count = 0;
        for group in &self.groups {
            let prefix = group.url_prefix();
            for model in &group.models {
                let key = model.key();
                let columns = columns_by_model
                    .get(&key)
                    .cloned()
                    .unwrap_or_default();
                let relationships = resolve_model_relationships(model, &columns_by_model)?;
                relationship_count += relationships.len();
                let form = synthesize_form(&columns);
                namespace.register(ModelDescriptor::new(
                    model.name.clone(),
                    key,
                    group.name.clone(),
                    prefix.clone(),
                    columns,
                    relationships,
                    form,
                ))?;
            }
        }

        namespace.warnings = warnings;
        namespace.freeze();
        info!(
            models = namespace.len(),
            relationships = relationship_count,
            warnings = namespace.warnings().len(),
            "model synthesis complete"
        );
        Ok(namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{ColumnKind, SynthesisWarning};
    use bauplan_model::{FieldDecl, ModelDecl, Primitive};

    fn taxonomy() -> ModelGroup {
        ModelGroup::new("taxonomy")
            .with_model(
                ModelDecl::new("Genus")
                    .with_field(FieldDecl::required("name", Primitive::Text))
                    .with_field(FieldDecl::required("family", Primitive::Text))
                    .with_field(FieldDecl::collection("species")),
            )
            .with_model(
                ModelDecl::new("Species")
                    .with_field(FieldDecl::required("genus_id", Primitive::Integer))
                    .with_field(FieldDecl::required("name", Primitive::Text)),
            )
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new(TypeRegistry::builtin(), MediaConfig::default())
    }

    #[test]
    fn test_synthesize_preserves_declaration_order() {
        let namespace = registry().with_group(taxonomy()).synthesize().unwrap();
        let keys: Vec<_> = namespace.keys().collect();
        assert_eq!(keys, ["genus", "species"]);
        assert!(namespace.is_frozen());
    }

    #[test]
    fn test_cross_group_references_resolve() {
        // The foreign key lives in a different group than its target; the
        // shared namespace must resolve it anyway.
        let herbarium = ModelGroup::new("herbarium").with_model(
            ModelDecl::new("Specimen")
                .with_field(FieldDecl::required("genus_id", Primitive::Integer))
                .with_field(FieldDecl::required("collected", Primitive::Date)),
        );
        let namespace = registry()
            .with_group(taxonomy())
            .with_group(herbarium)
            .synthesize()
            .unwrap();

        let specimen = namespace.get("specimen").unwrap();
        let fk = specimen.get_column("genus_id").unwrap();
        assert_eq!(fk.references(), Some("genus"));
        assert!(namespace.warnings().is_empty());
    }

    #[test]
    fn test_forward_reference_within_group_resolves() {
        // Species is declared before Genus; phase separation must still
        // wire both directions.
        let group = ModelGroup::new("taxonomy")
            .with_model(
                ModelDecl::new("Species")
                    .with_field(FieldDecl::required("genus_id", Primitive::Integer)),
            )
            .with_model(
                ModelDecl::new("Genus")
                    .with_field(FieldDecl::required("name", Primitive::Text))
                    .with_field(FieldDecl::collection("species")),
            );
        let namespace = registry().with_group(group).synthesize().unwrap();

        let genus = namespace.get("genus").unwrap();
        assert_eq!(genus.relationships().len(), 1);
        assert_eq!(genus.relationships()[0].child, "species");
    }

    #[test]
    fn test_duplicate_model_across_groups_fails() {
        let first = ModelGroup::new("one")
            .with_model(ModelDecl::new("Genus").with_field(FieldDecl::required("name", Primitive::Text)));
        let second = ModelGroup::new("two")
            .with_model(ModelDecl::new("Genus").with_field(FieldDecl::required("name", Primitive::Text)));
        let err = registry()
            .with_group(first)
            .with_group(second)
            .synthesize()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateModel { ref first, ref second, .. }
                if first == "one" && second == "two"
        ));
    }

    #[test]
    fn test_unmatched_foreign_key_is_reported() {
        let group = ModelGroup::new("orphans").with_model(
            ModelDecl::new("Species")
                .with_field(FieldDecl::required("genus_id", Primitive::Integer)),
        );
        let namespace = registry().with_group(group).synthesize().unwrap();

        let column = namespace.get("species").unwrap().get_column("genus_id").unwrap();
        assert_eq!(column.kind, ColumnKind::Plain);
        assert_eq!(
            namespace.warnings(),
            [SynthesisWarning::UnmatchedForeignKey {
                model: "species".into(),
                field: "genus_id".into(),
                target: "genus".into(),
            }]
        );
    }

    #[test]
    fn test_missing_collection_target_is_fatal() {
        let group = ModelGroup::new("taxonomy").with_model(
            ModelDecl::new("Genus")
                .with_field(FieldDecl::required("name", Primitive::Text))
                .with_field(FieldDecl::collection("species")),
        );
        let err = registry().with_group(group).synthesize().unwrap_err();
        assert!(matches!(err, Error::MissingRelationTarget { .. }));
    }

    #[test]
    fn test_registration_after_freeze_is_rejected() {
        let mut namespace = registry().with_group(taxonomy()).synthesize().unwrap();
        let mut stray = namespace.get("genus").unwrap().clone();
        stray.key = "stray".into();
        let err = namespace.register(stray).unwrap_err();
        assert!(matches!(err, Error::FrozenNamespace));
    }

    #[test]
    fn test_bundle_lookup() {
        let namespace = registry().with_group(taxonomy()).synthesize().unwrap();
        assert!(namespace.bundle("species", "name").is_some());
        assert!(namespace.bundle("species", "missing").is_none());
        assert!(namespace.bundle("missing", "name").is_none());
    }
}
