//! # Validate Subcommand
//!
//! Schema-checks a provider manifest and reports alias definition
//! violations per resource type.
//!
//! ```bash
//! armalias validate manifests/microsoft.network.yaml
//! ```
//!
//! Exit code 0 when every resource type validates, 1 otherwise.

use std::path::{Path, PathBuf};

use anyhow::Result;
use arm_alias::{EngineConfig, RegistryBuilder, ValidationViolations};
use clap::Args;

use crate::load_provider;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Provider manifest (JSON or YAML).
    pub manifest: PathBuf,

    /// Print resource types that validate cleanly as well.
    #[arg(long)]
    pub show_ok: bool,
}

/// Validation outcome for one resource type.
#[derive(Debug)]
pub struct ResourceTypeReport {
    /// Qualified resource type name.
    pub resource_type: String,
    /// Number of aliases declared.
    pub aliases: usize,
    /// Findings; empty when clean.
    pub violations: ValidationViolations,
}

/// Validate every resource type of a manifest.
pub fn validate_manifest(manifest: &Path, config: &EngineConfig) -> Result<Vec<ResourceTypeReport>> {
    let provider = load_provider(manifest, config)?;
    let mut builder = RegistryBuilder::new(config.clone());
    builder.register_provider(&provider)?;

    let reports = provider
        .resource_types
        .iter()
        .map(|rt| {
            let resource_type = provider.qualified_name(rt);
            let violations = builder.validate(&resource_type);
            ResourceTypeReport {
                resource_type,
                aliases: rt.aliases.len(),
                violations,
            }
        })
        .collect();
    Ok(reports)
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &EngineConfig) -> Result<u8> {
    let reports = validate_manifest(&args.manifest, config)?;

    let mut failed = 0usize;
    for report in &reports {
        if report.violations.is_empty() {
            if args.show_ok {
                println!("OK: {} ({} aliases)", report.resource_type, report.aliases);
            }
            continue;
        }
        failed += 1;
        println!(
            "FAIL: {} ({} violations)",
            report.resource_type,
            report.violations.len()
        );
        println!("{}", report.violations);
    }

    println!();
    println!(
        "{} resource types checked, {} failed",
        reports.len(),
        failed
    );
    Ok(if failed == 0 { 0 } else { 1 })
}
