//! # arm-cli — Alias Engine Command-Line Interface
//!
//! Thin wrapper over `arm-alias` for working with provider manifests from
//! a shell or CI job.
//!
//! ## Subcommands
//!
//! - `validate` — Schema-check a manifest and report alias violations
//! - `resolve` — Resolve one alias against a resource document
//! - `lookup` — Find the aliases that cover a concrete property path
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in one module per
//!   subcommand and return a process exit code.
//! - Handlers delegate to `arm-alias`; no alias semantics here.

pub mod lookup;
pub mod resolve;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use arm_alias::{parse_document, AliasRegistry, EngineConfig, ManifestFormat, ManifestLoader};
use arm_core::Provider;
use serde_json::Value;

/// Load the engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Load a provider manifest honoring the configured schema check.
pub fn load_provider(manifest: &Path, config: &EngineConfig) -> Result<Provider> {
    let loader = ManifestLoader::new(config)?;
    loader
        .load(manifest)
        .with_context(|| format!("failed to load manifest {}", manifest.display()))
}

/// Load a manifest and activate a registry from it.
pub fn load_registry(manifest: &Path, config: &EngineConfig) -> Result<(Provider, AliasRegistry)> {
    let provider = load_provider(manifest, config)?;
    let mut builder = AliasRegistry::builder(config.clone());
    builder.register_provider(&provider)?;
    let registry = builder
        .build()
        .with_context(|| format!("manifest {} has invalid aliases", manifest.display()))?;
    Ok((provider, registry))
}

/// Qualify a bare resource type name (`storageAccounts`) with the
/// provider namespace. Names already carrying the namespace pass through.
pub fn qualify_resource_type(provider: &Provider, resource_type: &str) -> String {
    let prefix = format!("{}/", provider.namespace);
    if resource_type.starts_with(&prefix) {
        resource_type.to_string()
    } else {
        format!("{prefix}{resource_type}")
    }
}

/// Read a resource document; `.yaml`/`.yml` files (any case) are read as
/// YAML, all others as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    parse_document(&content, ManifestFormat::from_path(path))
        .with_context(|| format!("invalid document {}", path.display()))
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;

    /// Repository root, for the fixture manifest.
    pub fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop(); // crates/
        dir.pop(); // repo root
        dir
    }

    pub fn fixture_manifest() -> PathBuf {
        repo_root().join("manifests/microsoft.network.yaml")
    }
}
