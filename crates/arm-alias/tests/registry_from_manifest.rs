//! Integration test: load the fixture provider manifest, activate a
//! registry from it, and resolve aliases against realistic documents.

use std::path::PathBuf;

use arm_alias::{load_manifest, AliasCatalog, AliasRegistry, EngineConfig, RegistryError};
use serde_json::json;

const NSG: &str = "Microsoft.Network/networkSecurityGroups";
const VNET: &str = "Microsoft.Network/virtualNetworks";
const ACCESS: &str = "Microsoft.Network/networkSecurityGroups/securityRules[*].access";

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn fixture_registry() -> AliasRegistry {
    let provider = load_manifest(&repo_root().join("manifests/microsoft.network.yaml"))
        .expect("fixture manifest should load");
    let mut builder = AliasRegistry::builder(EngineConfig::default());
    builder.register_provider(&provider).expect("no duplicate aliases");
    builder.build().expect("fixture aliases should validate")
}

fn nsg_document() -> serde_json::Value {
    json!({
        "name": "web-nsg",
        "properties": {
            "flushConnection": false,
            "securityRules": [
                {"name": "allow-https", "properties": {"access": "Allow", "priority": 100}},
                {"name": "deny-all", "properties": {"access": "Deny", "priority": 4096}}
            ]
        }
    })
}

#[test]
fn fixture_registers_every_resource_type() {
    let registry = fixture_registry();
    let types: Vec<&str> = registry.resource_types().collect();
    assert_eq!(types, vec![NSG, VNET]);
    assert!(registry.validate(NSG).is_empty());
    assert!(registry.get(NSG).unwrap().property_schema().is_some());
}

#[test]
fn resolve_with_version_specific_pattern() {
    let registry = fixture_registry();
    let body = nsg_document();
    let resolved = registry.resolve(NSG, ACCESS, "2023-04-01", &body).unwrap();
    let paths: Vec<&str> = resolved.iter().map(|r| r.resource_type_path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "properties/securityRules[allow-https]/properties/access",
            "properties/securityRules[deny-all]/properties/access",
        ]
    );
    assert!(resolved.iter().all(|r| r.api_version == "2023-04-01"));
    assert_eq!(resolved[0].metadata.as_ref().unwrap().kind, "String");
}

#[test]
fn resolve_older_version_uses_flat_layout() {
    let registry = fixture_registry();
    let body = json!({"properties": {"securityRules": [{"name": "a", "access": "Allow"}]}});
    let resolved = registry.resolve(NSG, ACCESS, "2018-01-01", &body).unwrap();
    let paths: Vec<&str> = resolved.iter().map(|r| r.resource_type_path.as_str()).collect();
    assert_eq!(paths, vec!["properties/securityRules[0]/access"]);
}

#[test]
fn unlisted_version_falls_back_to_default_path() {
    let registry = fixture_registry();
    let resolved = registry
        .resolve(NSG, ACCESS, "2015-06-15", &nsg_document())
        .unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(
        resolved[0].resource_type_path,
        "properties/securityRules[allow-https]/properties/access"
    );
    assert_eq!(resolved[0].api_version, "2015-06-15");
}

#[test]
fn evaluate_returns_document_values() {
    let registry = fixture_registry();
    let body = nsg_document();
    let values: Vec<&serde_json::Value> = registry
        .evaluate(NSG, ACCESS, "2020-05-01", &body)
        .unwrap()
        .into_iter()
        .map(|hit| hit.value)
        .collect();
    assert_eq!(values, vec![&json!("Allow"), &json!("Deny")]);
}

#[test]
fn missing_property_resolves_to_nothing() {
    let registry = fixture_registry();
    let resolved = registry
        .resolve(NSG, ACCESS, "2023-04-01", &json!({"properties": {}}))
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn unknown_alias_is_an_error() {
    let registry = fixture_registry();
    let err = registry
        .resolve(NSG, "Microsoft.Network/networkSecurityGroups/nope", "2023-04-01", &json!({}))
        .unwrap_err();
    assert!(matches!(err, RegistryError::AliasNotFound { .. }));
}

#[test]
fn full_pattern_over_tags() {
    let registry = fixture_registry();
    let body = json!({"tags": {"env-prod": "1", "env-test": "2", "owner": "net"}});
    let resolved = registry
        .resolve(VNET, "Microsoft.Network/virtualNetworks/tags", "2023-04-01", &body)
        .unwrap();
    let paths: Vec<&str> = resolved.iter().map(|r| r.resource_type_path.as_str()).collect();
    assert_eq!(paths, vec!["tags/env", "tags/owner"]);
}

#[test]
fn reverse_lookup_finds_aliases_for_resolved_paths() {
    let registry = fixture_registry();
    let by_path: Vec<&str> = registry
        .lookup_by_path(NSG, "properties/securityRules[deny-all]/properties/access")
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(by_path, vec![ACCESS]);

    let element: Vec<&str> = registry
        .lookup_by_path(NSG, "properties/securityRules[1]")
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(element, vec!["Microsoft.Network/networkSecurityGroups/securityRules[*]"]);
}

#[test]
fn catalog_serves_fixture_and_rejects_bad_update() {
    let provider = load_manifest(&repo_root().join("manifests/microsoft.network.yaml")).unwrap();
    let catalog = AliasCatalog::default();
    catalog.load_provider(&provider).unwrap();

    let broken = vec![arm_core::Alias::new("x", "properties/notInSchema")];
    let err = catalog.register(NSG, broken).unwrap_err();
    assert!(matches!(err, RegistryError::AliasDefinition { .. }));

    let active = catalog.snapshot();
    assert!(active.lookup_by_name(NSG, ACCESS).is_some());
}
