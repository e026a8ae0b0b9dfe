//! File-storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file-storage write path.
///
/// File-typed fields persist their content bytes beneath `root`, optionally
/// under the `storage_location` hint carried by the field's annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Root directory for persisted file content.
    pub root: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./media"),
        }
    }
}

impl MediaConfig {
    /// Create a configuration with the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
