//! # Alias Model
//!
//! The alias sub-schema of a resource type: a policy-facing alias name
//! mapped onto one or more property paths, each valid for a set of API
//! versions, with optional segment-rewrite patterns and metadata.
//!
//! ## Defaults
//!
//! An [`AliasPath`] may carry its own [`Pattern`] and [`Metadata`]; when it
//! does not, the alias-level `default_pattern` / `default_metadata` apply.
//! [`Alias::effective_pattern`] and [`Alias::effective_metadata`] encode
//! that inheritance rule in one place.

use serde::{Deserialize, Serialize};

/// How a matched segment is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    /// Only the captured `{variable}` portion of the segment is replaced.
    Extract,
    /// The entire segment is replaced.
    Full,
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extract => f.write_str("Extract"),
            Self::Full => f.write_str("Full"),
        }
    }
}

/// A segment rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Segment template. May contain the placeholder `{variable}` once.
    pub phrase: String,
    /// Name of the captured variable, and the key its value is read from.
    #[serde(default)]
    pub variable: String,
    /// Rewrite mode.
    #[serde(rename = "type")]
    pub kind: PatternType,
}

impl Pattern {
    /// Construct an `Extract` pattern.
    pub fn extract(phrase: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            variable: variable.into(),
            kind: PatternType::Extract,
        }
    }

    /// Construct a `Full` pattern.
    pub fn full(phrase: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            variable: variable.into(),
            kind: PatternType::Full,
        }
    }

    /// The placeholder token for this pattern's variable, e.g. `{name}`.
    ///
    /// Returns `None` when the variable is empty.
    pub fn placeholder(&self) -> Option<String> {
        if self.variable.is_empty() {
            None
        } else {
            Some(format!("{{{}}}", self.variable))
        }
    }
}

/// Free-form descriptive tags attached to an alias or a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    /// Value type tag, e.g. `"String"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Attribute tag, e.g. `"Modifiable"`.
    #[serde(default)]
    pub attributes: String,
}

/// One concrete property path an alias maps to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasPath {
    /// Declared property path, e.g. `properties/ipRules[*]/value`.
    pub path: String,
    /// API versions this path is valid for, in declaration order.
    #[serde(default)]
    pub api_versions: Vec<String>,
    /// Pattern override for this path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Metadata override for this path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AliasPath {
    /// A path valid for the given API versions, without overrides.
    pub fn new<I, S>(path: impl Into<String>, api_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            api_versions: api_versions.into_iter().map(Into::into).collect(),
            pattern: None,
            metadata: None,
        }
    }

    /// Attach a pattern override.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Attach a metadata override.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether `api_version` is listed for this path.
    pub fn supports(&self, api_version: &str) -> bool {
        self.api_versions.iter().any(|v| v == api_version)
    }
}

/// A policy-facing alias for one or more resource property paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    /// Alias name, unique within its resource type.
    pub name: String,
    /// Alias type tag, e.g. `"PlainText"` or `"Mask"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Declared paths, in declaration order.
    #[serde(default)]
    pub paths: Vec<AliasPath>,
    /// The path used when no entry lists the requested API version.
    #[serde(default)]
    pub default_path: String,
    /// Pattern inherited by paths without their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pattern: Option<Pattern>,
    /// Metadata inherited by paths without their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_metadata: Option<Metadata>,
}

impl Alias {
    /// An alias with a default path and no declared paths.
    pub fn new(name: impl Into<String>, default_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_path: default_path.into(),
            ..Self::default()
        }
    }

    /// Append a declared path.
    pub fn with_path(mut self, path: AliasPath) -> Self {
        self.paths.push(path);
        self
    }

    /// Set the alias-level default pattern.
    pub fn with_default_pattern(mut self, pattern: Pattern) -> Self {
        self.default_pattern = Some(pattern);
        self
    }

    /// Set the alias-level default metadata.
    pub fn with_default_metadata(mut self, metadata: Metadata) -> Self {
        self.default_metadata = Some(metadata);
        self
    }

    /// The pattern that applies to `path`: its own, else the alias default.
    pub fn effective_pattern<'a>(&'a self, path: &'a AliasPath) -> Option<&'a Pattern> {
        path.pattern.as_ref().or(self.default_pattern.as_ref())
    }

    /// The metadata that applies to `path`: its own, else the alias default.
    pub fn effective_metadata<'a>(&'a self, path: &'a AliasPath) -> Option<&'a Metadata> {
        path.metadata.as_ref().or(self.default_metadata.as_ref())
    }

    /// The declared entry whose `path` equals `default_path`, if any.
    pub fn default_entry(&self) -> Option<&AliasPath> {
        self.paths.iter().find(|p| p.path == self.default_path)
    }

    /// Whether the `default_path` consistency rule holds.
    ///
    /// Vacuously true when `paths` is empty.
    pub fn default_path_is_consistent(&self) -> bool {
        self.paths.is_empty() || self.default_entry().is_some()
    }
}

/// A concrete, API-version-bound property path produced by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPath {
    /// Concrete path into the resource document.
    pub resource_type_path: String,
    /// The API version the path was resolved for.
    pub api_version: String,
    /// Effective metadata of the declared path that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ResolvedPath {
    /// A resolved path without metadata.
    pub fn new(resource_type_path: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            resource_type_path: resource_type_path.into(),
            api_version: api_version.into(),
            metadata: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn access_tier() -> Alias {
        Alias::new("Microsoft.Storage/accessTier", "properties/accessTier")
            .with_path(AliasPath::new("properties/accessTier", ["2021-01-01"]))
    }

    #[test]
    fn test_alias_deserializes_arm_wire_names() {
        let alias: Alias = serde_json::from_value(json!({
            "name": "Microsoft.Network/networkSecurityGroups/securityRules[*].name",
            "type": "PlainText",
            "defaultPath": "properties/securityRules[*]/name",
            "paths": [{
                "path": "properties/securityRules[*]/name",
                "apiVersions": ["2020-05-01", "2019-11-01"],
                "pattern": {"phrase": "[{name}]", "variable": "name", "type": "Extract"},
                "metadata": {"type": "String", "attributes": "Modifiable"}
            }],
            "defaultMetadata": {"type": "String", "attributes": "None"}
        }))
        .unwrap();

        assert_eq!(alias.kind, "PlainText");
        assert_eq!(alias.paths.len(), 1);
        assert_eq!(alias.paths[0].api_versions, vec!["2020-05-01", "2019-11-01"]);
        let pattern = alias.paths[0].pattern.as_ref().unwrap();
        assert_eq!(pattern.kind, PatternType::Extract);
        assert_eq!(pattern.placeholder().as_deref(), Some("{name}"));
        assert_eq!(alias.paths[0].metadata.as_ref().unwrap().attributes, "Modifiable");
        assert!(alias.default_pattern.is_none());
    }

    #[test]
    fn test_effective_pattern_prefers_path_override() {
        let default = Pattern::full("tags", "");
        let own = Pattern::extract("[{key}]", "key");
        let alias = Alias::new("a", "tags")
            .with_default_pattern(default.clone())
            .with_path(AliasPath::new("tags", ["1"]).with_pattern(own.clone()))
            .with_path(AliasPath::new("tags[*]", ["2"]));

        assert_eq!(alias.effective_pattern(&alias.paths[0]), Some(&own));
        assert_eq!(alias.effective_pattern(&alias.paths[1]), Some(&default));
    }

    #[test]
    fn test_effective_metadata_inherits_default() {
        let meta = Metadata {
            kind: "String".into(),
            attributes: "Modifiable".into(),
        };
        let alias = access_tier().with_default_metadata(meta.clone());
        assert_eq!(alias.effective_metadata(&alias.paths[0]), Some(&meta));
    }

    #[test]
    fn test_default_path_consistency() {
        assert!(access_tier().default_path_is_consistent());
        assert!(Alias::new("a", "properties/x").default_path_is_consistent());

        let mut broken = access_tier();
        broken.default_path = "properties/tier".into();
        assert!(!broken.default_path_is_consistent());
        assert!(broken.default_entry().is_none());
    }

    #[test]
    fn test_resolved_path_omits_absent_metadata() {
        let resolved = ResolvedPath::new("properties/accessTier", "2021-01-01");
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(
            value,
            json!({"resourceTypePath": "properties/accessTier", "apiVersion": "2021-01-01"})
        );
    }

    #[test]
    fn test_path_supports_api_version() {
        let path = AliasPath::new("properties/x", ["2021-01-01", "2020-01-01"]);
        assert!(path.supports("2020-01-01"));
        assert!(!path.supports("2019-01-01"));
    }
}
