//! # Alias Definition Validation
//!
//! Structural checks over the aliases of one resource type. Validation
//! never fails; it reports every violation it finds and leaves policy to
//! the caller. [`RegistryBuilder::build`](crate::RegistryBuilder::build)
//! refuses to activate a registry with violations.
//!
//! ## Checks
//!
//! - `defaultPath` must equal the `path` of some declared entry when
//!   `paths` is non-empty.
//! - `defaultPath` and every declared `path` must parse.
//! - Every pattern must satisfy its invariants.
//! - With a property schema attached, every declared path must be
//!   reachable through it (`properties`, `items`, `additionalProperties`,
//!   local `$ref`).

use std::fmt;

use arm_core::{Alias, PathStep, PropertyPath};
use serde_json::Value;

use crate::pattern::CompiledPattern;

/// `$ref` chains longer than this are treated as cycles.
const MAX_REF_DEPTH: usize = 32;

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// `defaultPath` matches no declared path.
    DefaultPathMismatch,
    /// A path does not parse, or the alias declares no path at all.
    MalformedPath,
    /// A pattern violates its invariants.
    InvalidPattern,
    /// A path is not reachable through the resource property schema.
    UnknownProperty,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the offending alias.
    pub alias: String,
    /// The offending path, when the finding concerns one.
    pub path: Option<String>,
    /// Category.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "  {} ({}): {}", self.alias, path, self.message),
            None => write!(f, "  {}: {}", self.alias, self.message),
        }
    }
}

/// Collection of validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    fn push(&mut self, alias: &Alias, path: Option<&str>, kind: ViolationKind, message: String) {
        self.violations.push(Violation {
            alias: alias.name.clone(),
            path: path.map(str::to_string),
            kind,
            message,
        });
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validate a set of aliases, optionally against a resource property schema.
pub fn validate_aliases(aliases: &[Alias], property_schema: Option<&Value>) -> ValidationViolations {
    let mut out = ValidationViolations::default();
    for alias in aliases {
        validate_alias(alias, property_schema, &mut out);
    }
    out
}

fn validate_alias(alias: &Alias, schema: Option<&Value>, out: &mut ValidationViolations) {
    if !alias.default_path_is_consistent() {
        out.push(
            alias,
            Some(&alias.default_path),
            ViolationKind::DefaultPathMismatch,
            format!(
                "defaultPath matches none of the {} declared paths",
                alias.paths.len()
            ),
        );
    }

    if alias.paths.is_empty() && alias.default_path.is_empty() {
        out.push(
            alias,
            None,
            ViolationKind::MalformedPath,
            "alias declares neither paths nor a defaultPath".to_string(),
        );
    } else if alias.default_entry().is_none() && !alias.default_path.is_empty() {
        check_path(alias, &alias.default_path, schema, out);
    }

    for entry in &alias.paths {
        check_path(alias, &entry.path, schema, out);
    }

    let patterns = alias
        .default_pattern
        .iter()
        .map(|p| (None, p))
        .chain(
            alias
                .paths
                .iter()
                .filter_map(|entry| entry.pattern.as_ref().map(|p| (Some(entry.path.as_str()), p))),
        );
    for (path, pattern) in patterns {
        if let Err(e) = CompiledPattern::compile(pattern) {
            out.push(alias, path, ViolationKind::InvalidPattern, e.to_string());
        }
    }
}

fn check_path(alias: &Alias, path: &str, schema: Option<&Value>, out: &mut ValidationViolations) {
    let parsed = match PropertyPath::parse(path) {
        Ok(parsed) => parsed,
        Err(e) => {
            out.push(alias, Some(path), ViolationKind::MalformedPath, e.to_string());
            return;
        }
    };
    if let Some(schema) = schema {
        if let Err(reason) = schema_accepts(schema, &parsed) {
            out.push(alias, Some(path), ViolationKind::UnknownProperty, reason);
        }
    }
}

/// Walk `path` through a JSON Schema.
fn schema_accepts(root: &Value, path: &PropertyPath) -> Result<(), String> {
    let mut node = follow_refs(root, root)?;
    for step in path.steps() {
        if is_permissive(node) {
            return Ok(());
        }
        let next = match step {
            PathStep::Key(key) => node
                .get("properties")
                .and_then(|props| props.get(key.as_str()))
                .or_else(|| schema_valued(node.get("additionalProperties")))
                .ok_or_else(|| format!("property '{key}' is not declared in the resource schema"))?,
            PathStep::Index(_) | PathStep::Wildcard => node
                .get("items")
                .or_else(|| match step {
                    PathStep::Wildcard => schema_valued(node.get("additionalProperties")),
                    _ => None,
                })
                .ok_or_else(|| format!("'{step:?}' applied to a schema that is neither an array nor a map"))?,
        };
        node = follow_refs(root, next)?;
    }
    Ok(())
}

/// `additionalProperties` counts as a child schema unless it is `false`.
fn schema_valued(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !matches!(v, Value::Bool(false)))
}

/// `true`, and object schemas that constrain nothing structural, accept any path.
fn is_permissive(node: &Value) -> bool {
    match node {
        Value::Bool(accept) => *accept,
        Value::Object(map) => !["properties", "items", "additionalProperties", "type"]
            .iter()
            .any(|k| map.contains_key(*k)),
        _ => false,
    }
}

/// Resolve local `#/...` references.
fn follow_refs<'s>(root: &'s Value, mut node: &'s Value) -> Result<&'s Value, String> {
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
            return Ok(node);
        };
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| format!("only local $ref is supported, found '{reference}'"))?;
        node = root
            .pointer(pointer)
            .ok_or_else(|| format!("unresolvable $ref '{reference}'"))?;
    }
    Err("$ref chain too deep".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arm_core::{AliasPath, Pattern};
    use serde_json::json;

    fn storage_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "properties": {
                    "type": "object",
                    "properties": {
                        "accessTier": {"type": "string"},
                        "ipRules": {"type": "array", "items": {"$ref": "#/definitions/ipRule"}},
                        "settings": {"type": "object", "additionalProperties": {"type": "string"}}
                    },
                    "additionalProperties": false
                },
                "tags": {"type": "object", "additionalProperties": true}
            },
            "definitions": {
                "ipRule": {
                    "type": "object",
                    "properties": {"value": {"type": "string"}, "action": {"type": "string"}}
                }
            }
        })
    }

    #[test]
    fn test_consistent_alias_is_clean() {
        let alias = Alias::new("a", "properties/accessTier")
            .with_path(AliasPath::new("properties/accessTier", ["v1"]));
        assert!(validate_aliases(&[alias], None).is_empty());
    }

    #[test]
    fn test_default_path_mismatch_reported() {
        let alias = Alias::new("a", "properties/tier")
            .with_path(AliasPath::new("properties/accessTier", ["v1"]));
        let violations = validate_aliases(&[alias], None);
        assert_eq!(violations.len(), 1);
        let v = &violations.violations()[0];
        assert_eq!(v.kind, ViolationKind::DefaultPathMismatch);
        assert_eq!(v.path.as_deref(), Some("properties/tier"));
    }

    #[test]
    fn test_alias_without_paths_needs_default_path() {
        let violations = validate_aliases(&[Alias::new("empty", "")], None);
        assert_eq!(violations.of_kind(ViolationKind::MalformedPath).count(), 1);
        assert!(validate_aliases(&[Alias::new("ok", "properties/x")], None).is_empty());
    }

    #[test]
    fn test_malformed_paths_reported() {
        let alias = Alias::new("a", "properties/rules[*]")
            .with_path(AliasPath::new("properties/rules[*]", ["v1"]))
            .with_path(AliasPath::new("properties//rules", ["v2"]));
        let violations = validate_aliases(&[alias], None);
        let malformed: Vec<_> = violations.of_kind(ViolationKind::MalformedPath).collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].path.as_deref(), Some("properties//rules"));
    }

    #[test]
    fn test_invalid_patterns_reported() {
        let alias = Alias::new("a", "rules[*]")
            .with_default_pattern(Pattern::extract("[{name}]", ""))
            .with_path(AliasPath::new("rules[*]", ["v1"]).with_pattern(Pattern::full("", "")));
        let violations = validate_aliases(&[alias], None);
        assert_eq!(violations.of_kind(ViolationKind::InvalidPattern).count(), 2);
    }

    #[test]
    fn test_schema_accepts_declared_paths() {
        let schema = storage_schema();
        let aliases = vec![
            Alias::new("tier", "properties/accessTier"),
            Alias::new("ipValue", "properties/ipRules[*]/value"),
            Alias::new("firstIp", "properties/ipRules[0]/action"),
            Alias::new("setting", "properties/settings/[*]"),
            Alias::new("tagValue", "tags/anything/deeper"),
        ];
        let violations = validate_aliases(&aliases, Some(&schema));
        assert!(violations.is_empty(), "{violations}");
    }

    #[test]
    fn test_schema_rejects_unknown_properties() {
        let schema = storage_schema();
        let aliases = vec![
            Alias::new("typo", "properties/accesTier"),
            Alias::new("notArray", "properties/accessTier[*]"),
            Alias::new("badLeaf", "properties/ipRules[*]/port"),
        ];
        let violations = validate_aliases(&aliases, Some(&schema));
        let names: Vec<&str> = violations
            .of_kind(ViolationKind::UnknownProperty)
            .map(|v| v.alias.as_str())
            .collect();
        assert_eq!(names, vec!["typo", "notArray", "badLeaf"]);
    }

    #[test]
    fn test_unresolvable_ref_reported() {
        let schema = json!({"properties": {"a": {"$ref": "#/definitions/missing"}}});
        let violations = validate_aliases(&[Alias::new("a", "a/b")], Some(&schema));
        assert_eq!(violations.len(), 1);
        assert!(violations.violations()[0].message.contains("unresolvable"));
    }

    #[test]
    fn test_violation_display() {
        let alias = Alias::new("Microsoft.Storage/tier", "properties/tier")
            .with_path(AliasPath::new("properties/accessTier", ["v1"]));
        let display = validate_aliases(&[alias], None).to_string();
        assert!(display.contains("Microsoft.Storage/tier (properties/tier)"));
        assert!(display.contains("defaultPath matches none"));
    }
}
