//! # Resolve Subcommand
//!
//! Resolves one alias against a resource document and prints the concrete
//! property paths as JSON.
//!
//! ```bash
//! armalias resolve manifests/microsoft.network.yaml \
//!     --resource-type networkSecurityGroups \
//!     --alias 'Microsoft.Network/networkSecurityGroups/securityRules[*].access' \
//!     --api-version 2023-04-01 nsg.json
//! ```
//!
//! An alias that resolves to nothing prints `[]` and exits 0.

use std::path::PathBuf;

use anyhow::Result;
use arm_alias::EngineConfig;
use clap::Args;
use serde_json::{json, Value};

use crate::{load_document, load_registry, qualify_resource_type};

/// Arguments for the resolve subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Provider manifest (JSON or YAML).
    pub manifest: PathBuf,

    /// Resource type, bare (`storageAccounts`) or qualified.
    #[arg(long)]
    pub resource_type: String,

    /// Alias name.
    #[arg(long)]
    pub alias: String,

    /// API version of the document.
    #[arg(long)]
    pub api_version: String,

    /// Resource document (JSON, or YAML by extension).
    pub document: PathBuf,

    /// Include the value found at each resolved path.
    #[arg(long)]
    pub values: bool,
}

/// Resolve the requested alias and render the result as JSON.
pub fn resolve_to_json(args: &ResolveArgs, config: &EngineConfig) -> Result<Value> {
    let (provider, registry) = load_registry(&args.manifest, config)?;
    let resource_type = qualify_resource_type(&provider, &args.resource_type);
    let document = load_document(&args.document)?;

    if !args.values {
        let resolved =
            registry.resolve(&resource_type, &args.alias, &args.api_version, &document)?;
        return Ok(serde_json::to_value(resolved)?);
    }

    let hits = registry.evaluate(&resource_type, &args.alias, &args.api_version, &document)?;
    let rendered = hits
        .into_iter()
        .map(|hit| -> Result<Value> {
            let mut entry = serde_json::to_value(&hit.path)?;
            if let Value::Object(map) = &mut entry {
                map.insert("value".to_string(), hit.value.clone());
            }
            Ok(entry)
        })
        .collect::<Result<Vec<Value>>>()?;
    Ok(json!(rendered))
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, config: &EngineConfig) -> Result<u8> {
    let output = resolve_to_json(args, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture_manifest;

    const ACCESS: &str = "Microsoft.Network/networkSecurityGroups/securityRules[*].access";

    fn args(document: PathBuf, api_version: &str, values: bool) -> ResolveArgs {
        ResolveArgs {
            manifest: fixture_manifest(),
            resource_type: "networkSecurityGroups".to_string(),
            alias: ACCESS.to_string(),
            api_version: api_version.to_string(),
            document,
            values,
        }
    }

    fn write_document(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("nsg.json");
        std::fs::write(
            &path,
            r#"{"properties": {"securityRules": [
                {"name": "ssh", "properties": {"access": "Deny"}}
            ]}}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_resolve_prints_paths() {
        let dir = tempfile::tempdir().unwrap();
        let output =
            resolve_to_json(&args(write_document(&dir), "2023-04-01", false), &EngineConfig::default())
                .unwrap();
        assert_eq!(
            output,
            json!([{
                "apiVersion": "2023-04-01",
                "metadata": {"attributes": "None", "type": "String"},
                "resourceTypePath": "properties/securityRules[ssh]/properties/access"
            }])
        );
    }

    #[test]
    fn test_resolve_with_values() {
        let dir = tempfile::tempdir().unwrap();
        let output =
            resolve_to_json(&args(write_document(&dir), "2023-04-01", true), &EngineConfig::default())
                .unwrap();
        assert_eq!(output[0]["value"], json!("Deny"));
    }

    #[test]
    fn test_resolve_empty_result_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        let a = args(path, "2023-04-01", false);
        assert_eq!(resolve_to_json(&a, &EngineConfig::default()).unwrap(), json!([]));
        assert_eq!(run_resolve(&a, &EngineConfig::default()).unwrap(), 0);
    }

    #[test]
    fn test_resolve_unknown_alias_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_document(&dir), "2023-04-01", false);
        a.alias = "nope".to_string();
        assert!(run_resolve(&a, &EngineConfig::default()).is_err());
    }
}
