//! Bauplan model contract - declared types, field declarations, and runtime values.
//!
//! This crate defines the declarative surface shared between the synthesis
//! core and its collaborators (storage, UI, and routing layers): a model is
//! a name plus an ordered list of field declarations, and a field value can
//! exist in internal, storage, and external representations.

pub mod decl;
pub mod naming;
pub mod types;
pub mod value;

pub use decl::{FieldDecl, FieldDefault, ModelDecl, ModelGroup};
pub use naming::{camel_to_snake, label, snake_to_camel};
pub use types::{DeclaredType, Primitive};
pub use value::Value;
