//! # Provider Manifest Loading
//!
//! Reads resource provider manifests (JSON or YAML) into
//! [`Provider`] records.
//!
//! ## Pipeline
//!
//! 1. Parse the text into a `serde_json::Value`. YAML is converted to JSON
//!    first so both formats go through the same schema check.
//! 2. When [`EngineConfig::check_manifest_schema`] is on, validate the
//!    document against the embedded `provider-manifest.schema.json`
//!    (Draft 2020-12). Every violation is reported, not just the first.
//! 3. Deserialize into [`Provider`].
//!
//! Alias-level invariants (`defaultPath` consistency, path syntax, pattern
//! rules) are not checked here; they are the registry's job.

use std::fmt;
use std::path::Path;

use arm_core::Provider;
use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;

/// The provider manifest JSON Schema, embedded at build time.
pub const MANIFEST_SCHEMA: &str = include_str!("../../../schemas/provider-manifest.schema.json");

/// Manifest serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ManifestFormat {
    /// Infer the format from a file extension. Anything other than
    /// `.yaml`/`.yml` is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Error loading a provider manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest '{path}': {source}")]
    Io {
        /// Path of the manifest.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not well-formed or does not deserialize.
    #[error("manifest parse error: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },

    /// The manifest does not conform to the provider manifest schema.
    #[error("manifest violates schema:\n{}", .violations.join("\n"))]
    SchemaViolation {
        /// One line per violation, `instance_path: message`.
        violations: Vec<String>,
    },

    /// The embedded schema failed to compile.
    #[error("manifest schema failed to compile: {0}")]
    SchemaBuild(String),
}

/// Parses and (optionally) schema-checks provider manifests.
///
/// The schema is compiled once per loader.
pub struct ManifestLoader {
    validator: Option<jsonschema::Validator>,
}

impl fmt::Debug for ManifestLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestLoader")
            .field("schema_checked", &self.validator.is_some())
            .finish()
    }
}

impl ManifestLoader {
    /// A loader honoring `config.check_manifest_schema`.
    ///
    /// # Errors
    ///
    /// [`ManifestError::SchemaBuild`] if the embedded schema does not
    /// compile.
    pub fn new(config: &EngineConfig) -> Result<Self, ManifestError> {
        if !config.check_manifest_schema {
            return Ok(Self { validator: None });
        }

        let schema: Value = serde_json::from_str(MANIFEST_SCHEMA)
            .map_err(|e| ManifestError::SchemaBuild(e.to_string()))?;
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| ManifestError::SchemaBuild(e.to_string()))?;
        Ok(Self {
            validator: Some(validator),
        })
    }

    /// Parse manifest text.
    pub fn parse(&self, content: &str, format: ManifestFormat) -> Result<Provider, ManifestError> {
        let document = parse_document(content, format)?;

        if let Some(validator) = &self.validator {
            let violations: Vec<String> = validator
                .iter_errors(&document)
                .map(|e| {
                    let at = e.instance_path.to_string();
                    if at.is_empty() {
                        format!("  (root): {e}")
                    } else {
                        format!("  {at}: {e}")
                    }
                })
                .collect();
            if !violations.is_empty() {
                tracing::warn!(violations = violations.len(), "manifest rejected by schema");
                return Err(ManifestError::SchemaViolation { violations });
            }
        }

        let provider: Provider = serde_json::from_value(document).map_err(|e| ManifestError::Parse {
            reason: e.to_string(),
        })?;
        tracing::debug!(
            namespace = %provider.namespace,
            resource_types = provider.resource_types.len(),
            "parsed provider manifest"
        );
        Ok(provider)
    }

    /// Read and parse a manifest file; the format follows the extension.
    pub fn load(&self, path: &Path) -> Result<Provider, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.parse(&content, ManifestFormat::from_path(path))
    }
}

/// Parse manifest text with the default configuration.
pub fn parse_manifest(content: &str, format: ManifestFormat) -> Result<Provider, ManifestError> {
    ManifestLoader::new(&EngineConfig::default())?.parse(content, format)
}

/// Load a manifest file with the default configuration.
pub fn load_manifest(path: &Path) -> Result<Provider, ManifestError> {
    ManifestLoader::new(&EngineConfig::default())?.load(path)
}

/// Parse JSON or YAML text into a JSON value, with no schema check.
///
/// YAML input goes through the same conversion as manifests, so YAML and
/// JSON spellings of one document compare equal.
pub fn parse_document(content: &str, format: ManifestFormat) -> Result<Value, ManifestError> {
    match format {
        ManifestFormat::Json => serde_json::from_str(content).map_err(|e| ManifestError::Parse {
            reason: e.to_string(),
        }),
        ManifestFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| ManifestError::Parse {
                    reason: e.to_string(),
                })?;
            yaml_to_json(&yaml).map_err(|reason| ManifestError::Parse { reason })
        }
    }
}

/// Convert a YAML value to JSON. Tags are dropped; non-string scalar keys
/// are stringified.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON representation"))?
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.iter().map(yaml_to_json).collect::<Result<Vec<_>, _>>()?)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE_JSON: &str = r#"{
        "namespace": "Microsoft.Storage",
        "resourceTypes": [{
            "resourceType": "storageAccounts",
            "apiVersions": ["2021-01-01", "2019-06-01"],
            "aliases": [{
                "name": "Microsoft.Storage/storageAccounts/accessTier",
                "defaultPath": "properties/accessTier",
                "paths": [{"path": "properties/accessTier", "apiVersions": ["2021-01-01"]}]
            }]
        }]
    }"#;

    const STORAGE_YAML: &str = r#"
namespace: Microsoft.Storage
resourceTypes:
  - resourceType: storageAccounts
    apiVersions: ["2021-01-01", "2019-06-01"]
    aliases:
      - name: Microsoft.Storage/storageAccounts/accessTier
        defaultPath: properties/accessTier
        paths:
          - path: properties/accessTier
            apiVersions: ["2021-01-01"]
"#;

    #[test]
    fn test_embedded_schema_compiles() {
        let loader = ManifestLoader::new(&EngineConfig::default()).unwrap();
        assert!(format!("{loader:?}").contains("schema_checked: true"));
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let from_json = parse_manifest(STORAGE_JSON, ManifestFormat::Json).unwrap();
        let from_yaml = parse_manifest(STORAGE_YAML, ManifestFormat::Yaml).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.resource_types[0].aliases.len(), 1);
    }

    #[test]
    fn test_schema_rejects_bad_pattern_type() {
        let doc = r#"{
            "namespace": "Microsoft.Network",
            "resourceTypes": [{
                "resourceType": "networkSecurityGroups",
                "aliases": [{
                    "name": "rules",
                    "defaultPath": "properties/securityRules[*]",
                    "defaultPattern": {"phrase": "[{name}]", "variable": "name", "type": "Partial"}
                }]
            }]
        }"#;
        let err = parse_manifest(doc, ManifestFormat::Json).unwrap_err();
        match err {
            ManifestError::SchemaViolation { violations } => {
                assert!(violations.iter().any(|v| v.contains("/resourceTypes/0/aliases/0/defaultPattern/type")));
            }
            other => panic!("Expected SchemaViolation, got: {other}"),
        }
    }

    #[test]
    fn test_schema_reports_every_violation() {
        let doc = r#"{"resourceTypes": [{"aliases": [{}]}]}"#;
        match parse_manifest(doc, ManifestFormat::Json).unwrap_err() {
            ManifestError::SchemaViolation { violations } => assert!(violations.len() >= 3),
            other => panic!("Expected SchemaViolation, got: {other}"),
        }
    }

    #[test]
    fn test_schema_check_can_be_disabled() {
        let config = EngineConfig {
            check_manifest_schema: false,
            ..EngineConfig::default()
        };
        let loader = ManifestLoader::new(&config).unwrap();
        // Still rejected by deserialization: `namespace` is required.
        let err = loader.parse(r#"{"resourceTypes": []}"#, ManifestFormat::Json).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_malformed_text_is_parse_error() {
        assert!(matches!(
            parse_manifest("{not json", ManifestFormat::Json),
            Err(ManifestError::Parse { .. })
        ));
        assert!(matches!(
            parse_manifest("a: [b", ManifestFormat::Yaml),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ManifestFormat::from_path(Path::new("a/b.yaml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("b.YML")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("b.json")), ManifestFormat::Json);
        assert_eq!(ManifestFormat::from_path(Path::new("manifest")), ManifestFormat::Json);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.yaml");
        std::fs::write(&path, STORAGE_YAML).unwrap();
        let provider = load_manifest(&path).unwrap();
        assert_eq!(provider.namespace, "Microsoft.Storage");

        let missing = load_manifest(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, ManifestError::Io { .. }));
    }

    #[test]
    fn test_yaml_to_json_key_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nx: 1.5\n").unwrap();
        let json = yaml_to_json(&yaml).unwrap();
        assert_eq!(json["1"], "one");
        assert_eq!(json["true"], "yes");
        assert_eq!(json["x"], 1.5);
    }
}
