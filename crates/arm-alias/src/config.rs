//! # Engine Configuration
//!
//! Tunables shared by the manifest loader, the registry builder, and the
//! resolver. Loaded from YAML; every field has a default so an empty file
//! (or no file) is a valid configuration.
//!
//! ```yaml
//! max_resolved_paths: 500
//! check_manifest_schema: true
//! check_property_schema: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on the number of paths one alias may resolve to.
pub const DEFAULT_MAX_RESOLVED_PATHS: usize = 10_000;

/// Error loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Alias engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound on resolved paths per alias; excess is dropped with a warning.
    pub max_resolved_paths: usize,
    /// Validate manifests against the embedded provider manifest schema
    /// before deserializing them.
    pub check_manifest_schema: bool,
    /// Check declared alias paths against a resource type's
    /// `propertySchema` when one is attached.
    pub check_property_schema: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_resolved_paths: DEFAULT_MAX_RESOLVED_PATHS,
            check_manifest_schema: true,
            check_property_schema: true,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}
