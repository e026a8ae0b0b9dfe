//! Type descriptors and the type registry.
//!
//! A [`TypeDescriptor`] maps one declared primitive to its storage column
//! type, its UI widget kind, and up to four value transforms between the
//! internal, storage, and external representations. The [`TypeRegistry`] is
//! an explicit registration table keyed by base primitive; resolving a
//! declaration binds the descriptor to the declaration's annotation metadata
//! so the metadata stays reachable during conversion.

use crate::convert::ConvertCx;
use crate::error::Error;
use bauplan_model::{DeclaredType, Primitive, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Storage column types emitted to the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 text.
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Boolean value.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time of day.
    DateTime,
    /// JSON document.
    Json,
}

/// Input widget kinds emitted to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Single-line text input.
    TextInput,
    /// Integer input.
    IntegerInput,
    /// Floating-point input.
    FloatInput,
    /// Checkbox.
    Checkbox,
    /// Date picker.
    DateInput,
    /// Time picker.
    TimeInput,
    /// Combined date and time picker.
    DateTimeInput,
    /// File upload input.
    FileInput,
    /// Multi-line text area.
    TextArea,
    /// Enumerated choice select.
    Select,
}

/// A value transform between two field representations.
///
/// The input is `&mut` so a transform may rewrite its source representation
/// in place; the file storage transform uses this to drop content bytes from
/// the internal representation once they are persisted.
pub type Transform = Arc<dyn Fn(&ConvertCx<'_>, &mut Value) -> Result<Value, Error> + Send + Sync>;

/// Descriptor for one declared field type.
#[derive(Clone)]
pub struct TypeDescriptor {
    /// Target storage column type.
    pub column_type: ColumnType,
    /// Target UI widget kind.
    pub widget: WidgetKind,
    internal_to_storage: Option<Transform>,
    storage_to_internal: Option<Transform>,
    internal_to_external: Option<Transform>,
    external_to_internal: Option<Transform>,
}

impl TypeDescriptor {
    /// Create a descriptor with no transforms.
    pub fn new(column_type: ColumnType, widget: WidgetKind) -> Self {
        Self {
            column_type,
            widget,
            internal_to_storage: None,
            storage_to_internal: None,
            internal_to_external: None,
            external_to_internal: None,
        }
    }

    /// Set the internal-to-storage transform.
    pub fn internal_to_storage(
        mut self,
        f: impl Fn(&ConvertCx<'_>, &mut Value) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.internal_to_storage = Some(Arc::new(f));
        self
    }

    /// Set the storage-to-internal transform.
    pub fn storage_to_internal(
        mut self,
        f: impl Fn(&ConvertCx<'_>, &mut Value) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.storage_to_internal = Some(Arc::new(f));
        self
    }

    /// Set the internal-to-external transform.
    pub fn internal_to_external(
        mut self,
        f: impl Fn(&ConvertCx<'_>, &mut Value) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.internal_to_external = Some(Arc::new(f));
        self
    }

    /// Set the external-to-internal transform.
    pub fn external_to_internal(
        mut self,
        f: impl Fn(&ConvertCx<'_>, &mut Value) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.external_to_internal = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("column_type", &self.column_type)
            .field("widget", &self.widget)
            .field("internal_to_storage", &self.internal_to_storage.is_some())
            .field("storage_to_internal", &self.storage_to_internal.is_some())
            .field("internal_to_external", &self.internal_to_external.is_some())
            .field("external_to_internal", &self.external_to_internal.is_some())
            .finish()
    }
}

/// A descriptor resolved for one declared type.
///
/// Binds the shared [`TypeDescriptor`] to the annotation metadata of the
/// resolving declaration, if any, so hints like `storage_location` remain
/// reachable by the conversion pipeline.
#[derive(Debug, Clone)]
pub struct BoundDescriptor {
    descriptor: TypeDescriptor,
    annotation: Option<BTreeMap<String, String>>,
}

impl BoundDescriptor {
    /// The target storage column type.
    pub fn column_type(&self) -> ColumnType {
        self.descriptor.column_type
    }

    /// The target UI widget kind.
    pub fn widget(&self) -> WidgetKind {
        self.descriptor.widget
    }

    /// The annotation metadata this descriptor was resolved with.
    pub fn annotation(&self) -> Option<&BTreeMap<String, String>> {
        self.annotation.as_ref()
    }

    /// Look up an annotation metadata value by key.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.annotation
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// The internal-to-storage transform, if defined.
    pub fn internal_to_storage(&self) -> Option<&Transform> {
        self.descriptor.internal_to_storage.as_ref()
    }

    /// The storage-to-internal transform, if defined.
    pub fn storage_to_internal(&self) -> Option<&Transform> {
        self.descriptor.storage_to_internal.as_ref()
    }

    /// The internal-to-external transform, if defined.
    pub fn internal_to_external(&self) -> Option<&Transform> {
        self.descriptor.internal_to_external.as_ref()
    }

    /// The external-to-internal transform, if defined.
    pub fn external_to_internal(&self) -> Option<&Transform> {
        self.descriptor.external_to_internal.as_ref()
    }
}

/// Registry of type descriptors keyed by base primitive.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<Primitive, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry populated with all built-in descriptors.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Primitive::Bool, bool_descriptor());
        registry.register(Primitive::Integer, integer_descriptor());
        registry.register(Primitive::Float, float_descriptor());
        registry.register(Primitive::Text, text_descriptor());
        registry.register(Primitive::Date, date_descriptor());
        registry.register(Primitive::Time, time_descriptor());
        registry.register(Primitive::DateTime, datetime_descriptor());
        registry.register(Primitive::File, file_descriptor());
        registry.register(Primitive::Json, json_descriptor());
        registry
    }

    /// Register a descriptor for a base primitive.
    ///
    /// The last registration for a given base wins, so built-ins can be
    /// overridden before synthesis.
    pub fn register(&mut self, base: Primitive, descriptor: TypeDescriptor) {
        self.entries.insert(base, descriptor);
    }

    /// Resolve a declared type to a bound descriptor.
    ///
    /// Annotated declarations unwrap to the base primitive and re-attach
    /// their metadata to the result. Resolution is idempotent; an unknown
    /// base or the collection sentinel fails.
    pub fn resolve(&self, declared: &DeclaredType) -> Result<BoundDescriptor, Error> {
        let base = declared.base().ok_or_else(|| Error::UnknownType {
            declared: declared.to_string(),
        })?;
        let descriptor = self
            .entries
            .get(&base)
            .cloned()
            .ok_or_else(|| Error::UnknownType {
                declared: declared.to_string(),
            })?;
        let annotation = match declared {
            DeclaredType::Annotated { metadata, .. } => Some(metadata.clone()),
            _ => None,
        };
        Ok(BoundDescriptor {
            descriptor,
            annotation,
        })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn unexpected(expected: &str, got: &Value) -> Error {
    Error::InvalidValue(format!("expected {}, got {}", expected, got.kind()))
}

fn text_descriptor() -> TypeDescriptor {
    // All three representations are the same string; no transforms.
    TypeDescriptor::new(ColumnType::Text, WidgetKind::TextInput)
}

fn bool_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Boolean, WidgetKind::Checkbox)
        .internal_to_external(|_cx, v| match v {
            Value::Bool(b) => Ok(Value::Text(b.to_string())),
            other => Err(unexpected("bool", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => match s.as_str() {
                "true" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "off" | "0" | "" => Ok(Value::Bool(false)),
                other => Err(Error::InvalidValue(format!("not a boolean: `{}`", other))),
            },
            Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(unexpected("bool text", other)),
        })
}

fn integer_descriptor() -> TypeDescriptor {
    // Storage representation equals internal; only the external form differs.
    TypeDescriptor::new(ColumnType::Integer, WidgetKind::IntegerInput)
        .internal_to_external(|_cx, v| match v {
            Value::Int(i) => Ok(Value::Text(i.to_string())),
            other => Err(unexpected("int", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| Error::InvalidValue(format!("not an integer: `{}` ({})", s, e))),
            Value::Int(i) => Ok(Value::Int(*i)),
            other => Err(unexpected("integer text", other)),
        })
}

fn float_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Float, WidgetKind::FloatInput)
        .internal_to_external(|_cx, v| match v {
            Value::Float(f) => Ok(Value::Text(f.to_string())),
            other => Err(unexpected("float", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| Error::InvalidValue(format!("not a float: `{}` ({})", s, e))),
            Value::Float(f) => Ok(Value::Float(*f)),
            other => Err(unexpected("float text", other)),
        })
}

fn date_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Date, WidgetKind::DateInput)
        .internal_to_storage(|_cx, v| match v {
            Value::Date(d) => Ok(Value::Text(d.format(DATE_FORMAT).to_string())),
            other => Err(unexpected("date", other)),
        })
        .storage_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| Error::InvalidValue(format!("not a date: `{}` ({})", s, e))),
            other => Err(unexpected("date text", other)),
        })
        .internal_to_external(|_cx, v| match v {
            Value::Date(d) => Ok(Value::Text(d.format(DATE_FORMAT).to_string())),
            other => Err(unexpected("date", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| Error::InvalidValue(format!("not a date: `{}` ({})", s, e))),
            Value::Date(d) => Ok(Value::Date(*d)),
            other => Err(unexpected("date text", other)),
        })
}

fn time_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Time, WidgetKind::TimeInput)
        .internal_to_storage(|_cx, v| match v {
            Value::Time(t) => Ok(Value::Text(t.format(TIME_FORMAT).to_string())),
            other => Err(unexpected("time", other)),
        })
        .storage_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveTime::parse_from_str(s, TIME_FORMAT)
                .map(Value::Time)
                .map_err(|e| Error::InvalidValue(format!("not a time: `{}` ({})", s, e))),
            other => Err(unexpected("time text", other)),
        })
        .internal_to_external(|_cx, v| match v {
            Value::Time(t) => Ok(Value::Text(t.format(TIME_FORMAT).to_string())),
            other => Err(unexpected("time", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .map(Value::Time)
                .map_err(|e| Error::InvalidValue(format!("not a time: `{}` ({})", s, e))),
            Value::Time(t) => Ok(Value::Time(*t)),
            other => Err(unexpected("time text", other)),
        })
}

fn datetime_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::DateTime, WidgetKind::DateTimeInput)
        .internal_to_storage(|_cx, v| match v {
            Value::DateTime(dt) => Ok(Value::Text(dt.format(DATETIME_FORMAT).to_string())),
            other => Err(unexpected("datetime", other)),
        })
        .storage_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .map(Value::DateTime)
                .map_err(|e| Error::InvalidValue(format!("not a datetime: `{}` ({})", s, e))),
            other => Err(unexpected("datetime text", other)),
        })
        .internal_to_external(|_cx, v| match v {
            Value::DateTime(dt) => Ok(Value::Text(dt.format(DATETIME_FORMAT).to_string())),
            other => Err(unexpected("datetime", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
                .map(Value::DateTime)
                .map_err(|e| Error::InvalidValue(format!("not a datetime: `{}` ({})", s, e))),
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            other => Err(unexpected("datetime text", other)),
        })
}

fn json_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Json, WidgetKind::TextArea)
        .internal_to_storage(|_cx, v| match v {
            Value::Json(j) => Ok(Value::Text(j.to_string())),
            other => Err(unexpected("json", other)),
        })
        .storage_to_internal(|_cx, v| match v {
            Value::Text(s) => serde_json::from_str(s)
                .map(Value::Json)
                .map_err(|e| Error::InvalidValue(format!("not json: {}", e))),
            other => Err(unexpected("json text", other)),
        })
        .internal_to_external(|_cx, v| match v {
            Value::Json(j) => Ok(Value::Text(j.to_string())),
            other => Err(unexpected("json", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::Text(s) => serde_json::from_str(s)
                .map(Value::Json)
                .map_err(|e| Error::InvalidValue(format!("not json: {}", e))),
            Value::Json(j) => Ok(Value::Json(j.clone())),
            other => Err(unexpected("json text", other)),
        })
}

fn file_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(ColumnType::Text, WidgetKind::FileInput)
        // The documented I/O side effect: persisting to storage writes the
        // content bytes to disk and scrubs them from the internal value.
        .internal_to_storage(|cx, v| match v {
            Value::File { name, content } => {
                let bytes = content
                    .take()
                    .ok_or_else(|| Error::MissingFileContent(name.clone()))?;
                let path = crate::convert::store_file(cx, name, &bytes)?;
                Ok(Value::Text(path))
            }
            other => Err(unexpected("file", other)),
        })
        .storage_to_internal(|_cx, v| match v {
            Value::Text(path) => {
                let name = path.rsplit('/').next().unwrap_or(path).to_string();
                Ok(Value::File {
                    name,
                    content: None,
                })
            }
            other => Err(unexpected("file path text", other)),
        })
        .internal_to_external(|_cx, v| match v {
            Value::File { name, .. } => Ok(Value::Text(name.clone())),
            other => Err(unexpected("file", other)),
        })
        .external_to_internal(|_cx, v| match v {
            Value::File { name, content } => Ok(Value::File {
                name: name.clone(),
                content: content.clone(),
            }),
            other => Err(unexpected("file upload", other)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;

    fn cx_with<'a>(media: &'a MediaConfig) -> ConvertCx<'a> {
        ConvertCx::new(media, None)
    }

    #[test]
    fn test_resolve_primitive() {
        let registry = TypeRegistry::builtin();
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Integer))
            .unwrap();
        assert_eq!(bound.column_type(), ColumnType::Integer);
        assert_eq!(bound.widget(), WidgetKind::IntegerInput);
        assert!(bound.annotation().is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = TypeRegistry::builtin();
        let declared = DeclaredType::Primitive(Primitive::Date);
        let first = registry.resolve(&declared).unwrap();
        let second = registry.resolve(&declared).unwrap();
        assert_eq!(first.column_type(), second.column_type());
        assert_eq!(first.widget(), second.widget());
    }

    #[test]
    fn test_resolve_annotated_keeps_metadata() {
        let registry = TypeRegistry::builtin();
        let declared = DeclaredType::annotated(Primitive::File, [("storage_location", "species")]);
        let bound = registry.resolve(&declared).unwrap();
        assert_eq!(bound.column_type(), ColumnType::Text);
        assert_eq!(bound.metadata("storage_location"), Some("species"));
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = TypeRegistry::empty();
        let err = registry
            .resolve(&DeclaredType::Primitive(Primitive::Text))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownType { .. }));

        let registry = TypeRegistry::builtin();
        let err = registry.resolve(&DeclaredType::Collection).unwrap_err();
        assert!(matches!(err, Error::UnknownType { .. }));
    }

    #[test]
    fn test_register_override_wins() {
        let mut registry = TypeRegistry::builtin();
        registry.register(
            Primitive::Text,
            TypeDescriptor::new(ColumnType::Text, WidgetKind::TextArea),
        );
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Text))
            .unwrap();
        assert_eq!(bound.widget(), WidgetKind::TextArea);
    }

    #[test]
    fn test_date_round_trip() {
        let registry = TypeRegistry::builtin();
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Date))
            .unwrap();
        let media = MediaConfig::default();
        let cx = cx_with(&media);

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut internal = Value::Date(date);
        let mut stored = bound.internal_to_storage().unwrap()(&cx, &mut internal).unwrap();
        assert_eq!(stored, Value::Text("2024-03-09".into()));
        let back = bound.storage_to_internal().unwrap()(&cx, &mut stored).unwrap();
        assert_eq!(back, Value::Date(date));
    }

    #[test]
    fn test_integer_external_parse() {
        let registry = TypeRegistry::builtin();
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Integer))
            .unwrap();
        let media = MediaConfig::default();
        let cx = cx_with(&media);

        let mut external = Value::Text(" 42 ".into());
        let internal = bound.external_to_internal().unwrap()(&cx, &mut external).unwrap();
        assert_eq!(internal, Value::Int(42));

        let mut bad = Value::Text("nope".into());
        let err = bound.external_to_internal().unwrap()(&cx, &mut bad).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let registry = TypeRegistry::builtin();
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Json))
            .unwrap();
        let media = MediaConfig::default();
        let cx = cx_with(&media);

        let doc = serde_json::json!({"a": [1, 2], "b": "x"});
        let mut internal = Value::Json(doc.clone());
        let mut stored = bound.internal_to_storage().unwrap()(&cx, &mut internal).unwrap();
        let back = bound.storage_to_internal().unwrap()(&cx, &mut stored).unwrap();
        assert_eq!(back, Value::Json(doc));
    }

    #[test]
    fn test_text_has_no_transforms() {
        let registry = TypeRegistry::builtin();
        let bound = registry
            .resolve(&DeclaredType::Primitive(Primitive::Text))
            .unwrap();
        assert!(bound.internal_to_storage().is_none());
        assert!(bound.storage_to_internal().is_none());
        assert!(bound.internal_to_external().is_none());
        assert!(bound.external_to_internal().is_none());
    }
}
