//! Bidirectional value conversion.
//!
//! A [`ValueBundle`] holds one field's value in up to three representations:
//! internal, storage, and external. Seeding any one representation derives
//! the other two through the bound descriptor's transforms; absent
//! transforms leave the dependent slot unset. The pipeline is pure except
//! for the file storage write path, which persists content bytes to disk
//! under the configured media root.

use crate::config::MediaConfig;
use crate::error::Error;
use crate::types::BoundDescriptor;
use bauplan_model::Value;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

/// Per-conversion context handed to every transform.
pub struct ConvertCx<'a> {
    media: &'a MediaConfig,
    annotation: Option<&'a BTreeMap<String, String>>,
}

impl<'a> ConvertCx<'a> {
    /// Create a context from the media config and the field's annotation.
    pub fn new(media: &'a MediaConfig, annotation: Option<&'a BTreeMap<String, String>>) -> Self {
        Self { media, annotation }
    }

    /// The configured file-storage root.
    pub fn media(&self) -> &MediaConfig {
        self.media
    }

    /// Look up an annotation metadata value by key.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.annotation.and_then(|m| m.get(key)).map(String::as_str)
    }
}

/// The one representation supplied to seed a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    /// Seed from the internal representation.
    Internal(Value),
    /// Seed from the storage representation.
    Storage(Value),
    /// Seed from the external representation.
    External(Value),
}

/// A transient triple of (internal, storage, external) representations
/// bound to one field's descriptor.
///
/// The bundle is a stateful transformer, not a one-shot value object:
/// calling [`apply`](Self::apply) again with a fresh seed recomputes all
/// three slots, overwriting prior state.
#[derive(Debug)]
pub struct ValueBundle {
    descriptor: BoundDescriptor,
    media: MediaConfig,
    internal: Option<Value>,
    storage: Option<Value>,
    external: Option<Value>,
}

impl ValueBundle {
    /// Create an empty bundle for a field.
    pub fn new(descriptor: BoundDescriptor, media: MediaConfig) -> Self {
        Self {
            descriptor,
            media,
            internal: None,
            storage: None,
            external: None,
        }
    }

    /// Create a bundle and immediately apply a seed.
    pub fn seeded(
        descriptor: BoundDescriptor,
        media: MediaConfig,
        seed: Seed,
    ) -> Result<Self, Error> {
        let mut bundle = Self::new(descriptor, media);
        bundle.apply(seed)?;
        Ok(bundle)
    }

    /// Install a seed representation and derive the other two.
    ///
    /// All prior slots are cleared first. A missing transform leaves the
    /// dependent slot unset; it is not an error.
    pub fn apply(&mut self, seed: Seed) -> Result<(), Error> {
        self.internal = None;
        self.storage = None;
        self.external = None;
        match seed {
            Seed::Internal(value) => {
                self.internal = Some(value);
                self.derive_storage()?;
                self.derive_external()?;
            }
            Seed::Storage(value) => {
                self.storage = Some(value);
                self.derive_internal_from_storage()?;
                self.derive_external()?;
            }
            Seed::External(value) => {
                self.external = Some(value);
                self.derive_internal_from_external()?;
                self.derive_storage()?;
            }
        }
        Ok(())
    }

    /// The internal representation, if set.
    pub fn internal(&self) -> Option<&Value> {
        self.internal.as_ref()
    }

    /// The storage representation, if set.
    pub fn storage(&self) -> Option<&Value> {
        self.storage.as_ref()
    }

    /// The external representation, if set.
    pub fn external(&self) -> Option<&Value> {
        self.external.as_ref()
    }

    /// The bound descriptor this bundle converts with.
    pub fn descriptor(&self) -> &BoundDescriptor {
        &self.descriptor
    }

    fn derive_storage(&mut self) -> Result<(), Error> {
        let Some(transform) = self.descriptor.internal_to_storage().cloned() else {
            return Ok(());
        };
        let Some(internal) = self.internal.as_mut() else {
            return Ok(());
        };
        let cx = ConvertCx::new(&self.media, self.descriptor.annotation());
        self.storage = Some(transform(&cx, internal)?);
        Ok(())
    }

    fn derive_external(&mut self) -> Result<(), Error> {
        let Some(transform) = self.descriptor.internal_to_external().cloned() else {
            return Ok(());
        };
        let Some(internal) = self.internal.as_mut() else {
            return Ok(());
        };
        let cx = ConvertCx::new(&self.media, self.descriptor.annotation());
        self.external = Some(transform(&cx, internal)?);
        Ok(())
    }

    fn derive_internal_from_storage(&mut self) -> Result<(), Error> {
        let Some(transform) = self.descriptor.storage_to_internal().cloned() else {
            return Ok(());
        };
        let Some(storage) = self.storage.as_mut() else {
            return Ok(());
        };
        let cx = ConvertCx::new(&self.media, self.descriptor.annotation());
        self.internal = Some(transform(&cx, storage)?);
        Ok(())
    }

    fn derive_internal_from_external(&mut self) -> Result<(), Error> {
        let Some(transform) = self.descriptor.external_to_internal().cloned() else {
            return Ok(());
        };
        let Some(external) = self.external.as_mut() else {
            return Ok(());
        };
        let cx = ConvertCx::new(&self.media, self.descriptor.annotation());
        self.internal = Some(transform(&cx, external)?);
        Ok(())
    }
}

/// Persist file content under the configured media root.
///
/// The file lands beneath the `storage_location` annotation hint (if any)
/// with a collision-resistant name: a microsecond UTC timestamp plus the
/// sanitized original name. Returns the path relative to the media root.
pub(crate) fn store_file(cx: &ConvertCx<'_>, name: &str, bytes: &[u8]) -> Result<String, Error> {
    let location = cx.metadata("storage_location").unwrap_or("");
    let dir = cx.media().root.join(location);
    fs::create_dir_all(&dir)?;

    let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    let filename = format!("{}_{}", stamp, sanitize_filename(name));
    fs::write(dir.join(&filename), bytes)?;
    debug!(
        file = %filename,
        location = %location,
        bytes = bytes.len(),
        "persisted file content"
    );

    if location.is_empty() {
        Ok(filename)
    } else {
        Ok(format!("{}/{}", location, filename))
    }
}

/// Reduce a client-supplied filename to a safe character set.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Guard against names that sanitize to path-traversal dots.
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
