//! # armalias CLI entry point
//!
//! Parses command-line arguments, installs logging, loads the engine
//! configuration, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arm_cli::load_config;
use arm_cli::lookup::{run_lookup, LookupArgs};
use arm_cli::resolve::{run_resolve, ResolveArgs};
use arm_cli::validate::{run_validate, ValidateArgs};

/// ARM alias path tool
///
/// Validates resource provider manifests, resolves policy aliases against
/// resource documents, and maps concrete property paths back to aliases.
#[derive(Parser, Debug)]
#[command(name = "armalias", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schema-check a manifest and report alias definition violations.
    Validate(ValidateArgs),

    /// Resolve an alias against a resource document.
    Resolve(ResolveArgs),

    /// List the aliases covering a concrete property path.
    Lookup(LookupArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(?config, "engine configuration loaded");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Resolve(args) => run_resolve(&args, &config),
        Commands::Lookup(args) => run_lookup(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
