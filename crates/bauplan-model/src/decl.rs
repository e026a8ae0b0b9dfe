//! Model and field declarations.

use crate::naming::camel_to_snake;
use crate::types::{DeclaredType, Primitive};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Default value of a field declaration.
///
/// The three states carry distinct meaning: `Absent` means the field is
/// required with no initial value, `Null` means the field is explicitly
/// optional, and `Value` means the field is required with an initial value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FieldDefault {
    /// No default supplied; the field is required.
    #[default]
    Absent,
    /// Explicit null default; the field is optional and nullable.
    Null,
    /// A concrete default value; the field is required.
    Value(Value),
}

impl FieldDefault {
    /// Check if the default is the explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldDefault::Null)
    }

    /// Get the concrete default value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldDefault::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A single field declaration: name, declared type, optional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name (snake_case).
    pub name: String,
    /// Declared type.
    pub declared: DeclaredType,
    /// Default value state.
    pub default: FieldDefault,
}

impl FieldDecl {
    /// Declare a required field with no default.
    pub fn required(name: impl Into<String>, declared: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            default: FieldDefault::Absent,
        }
    }

    /// Declare an optional field (explicit null default).
    pub fn optional(name: impl Into<String>, declared: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            default: FieldDefault::Null,
        }
    }

    /// Declare a required field with a concrete default value.
    pub fn with_default(
        name: impl Into<String>,
        declared: impl Into<DeclaredType>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            default: FieldDefault::Value(default.into()),
        }
    }

    /// Declare a one-to-many collection field.
    ///
    /// The field name must be the snake_case key of the child model.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: DeclaredType::Collection,
            default: FieldDefault::Null,
        }
    }

    /// Check if this is a collection-sentinel field.
    pub fn is_collection(&self) -> bool {
        self.declared.is_collection()
    }

    /// Check if this field follows the foreign-key naming convention:
    /// a `_id` suffix with an integer base type.
    pub fn is_foreign_key_candidate(&self) -> bool {
        self.name.len() > 3
            && self.name.ends_with("_id")
            && self.declared.base() == Some(Primitive::Integer)
    }

    /// The referenced model key for a foreign-key candidate.
    pub fn foreign_key_target(&self) -> Option<&str> {
        if self.is_foreign_key_candidate() {
            Some(&self.name[..self.name.len() - 3])
        } else {
            None
        }
    }
}

/// A declared model: a CamelCase name plus an ordered list of fields.
///
/// Field declaration order is preserved verbatim into storage column order
/// and UI field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDecl {
    /// Declared name, CamelCase.
    pub name: String,
    /// Ordered field declarations.
    pub fields: Vec<FieldDecl>,
}

impl ModelDecl {
    /// Create a model declaration with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, preserving declaration order.
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// The snake_case namespace key, also used as the storage table name.
    pub fn key(&self) -> String {
        camel_to_snake(&self.name)
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An independently declared group of models sharing one namespace.
///
/// Groups keep their own url prefix for generated action links; model
/// references resolve across group boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGroup {
    /// Group name (snake_case).
    pub name: String,
    /// Url prefix override; defaults to `/{name}`.
    pub prefix: Option<String>,
    /// Models in source declaration order.
    pub models: Vec<ModelDecl>,
}

impl ModelGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            models: Vec::new(),
        }
    }

    /// Override the url prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a model, preserving declaration order.
    pub fn with_model(mut self, model: ModelDecl) -> Self {
        self.models.push(model);
        self
    }

    /// The effective url prefix for action links.
    pub fn url_prefix(&self) -> String {
        match &self.prefix {
            Some(p) => p.clone(),
            None => format!("/{}", self.name),
        }
    }
}
