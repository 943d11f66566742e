//! # Lookup Subcommand
//!
//! Reverse lookup: which aliases of a resource type cover a concrete
//! property path. Prints one alias name per line.
//!
//! ```bash
//! armalias lookup manifests/microsoft.network.yaml \
//!     --resource-type networkSecurityGroups 'properties/securityRules[0]'
//! ```
//!
//! Exit code 0 when at least one alias matches, 1 when none does.

use std::path::PathBuf;

use anyhow::Result;
use arm_alias::EngineConfig;
use clap::Args;

use crate::{load_registry, qualify_resource_type};

/// Arguments for the lookup subcommand.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Provider manifest (JSON or YAML).
    pub manifest: PathBuf,

    /// Resource type, bare or qualified.
    #[arg(long)]
    pub resource_type: String,

    /// Concrete property path, e.g. `properties/ipRules[2]/value`.
    pub path: String,
}

/// Names of the aliases whose declared paths cover `args.path`.
pub fn lookup_aliases(args: &LookupArgs, config: &EngineConfig) -> Result<Vec<String>> {
    let (provider, registry) = load_registry(&args.manifest, config)?;
    let resource_type = qualify_resource_type(&provider, &args.resource_type);
    if registry.get(&resource_type).is_none() {
        anyhow::bail!("resource type '{resource_type}' is not declared in the manifest");
    }
    Ok(registry
        .lookup_by_path(&resource_type, &args.path)
        .into_iter()
        .map(|alias| alias.name.clone())
        .collect())
}

/// Execute the lookup subcommand.
pub fn run_lookup(args: &LookupArgs, config: &EngineConfig) -> Result<u8> {
    let names = lookup_aliases(args, config)?;
    if names.is_empty() {
        tracing::info!(path = %args.path, "no alias covers path");
        return Ok(1);
    }
    for name in &names {
        println!("{name}");
    }
    Ok(0)
}
