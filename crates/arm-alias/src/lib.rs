//! # arm-alias — Alias Path Engine
//!
//! Translates policy-facing alias names (e.g.
//! `Microsoft.Storage/storageAccounts/accessTier`) into the concrete
//! property paths of a live resource document for a given API version.
//!
//! ## Components
//!
//! - [`pattern`]: compiles `phrase`/`variable`/`type` triples and rewrites
//!   one path segment at a time.
//! - [`resolve`]: walks a resource document along an alias's declared
//!   paths, expanding wildcards and applying the effective pattern.
//! - [`registry`]: per-resource-type alias sets with name and reverse path
//!   lookup, validated before activation.
//! - [`catalog`]: atomic publication of registries to concurrent readers.
//! - [`manifest`]: provider manifest loading with JSON Schema checks.
//! - [`config`]: engine tunables.
//!
//! ## Data Flow
//!
//! ```text
//! manifest ──▶ RegistryBuilder ──build()──▶ AliasRegistry ──▶ AliasCatalog
//!                 (register,                    │
//!                  validate)                    ▼
//!                              resolve(alias, apiVersion, document)
//!                                               │
//!                                               ▼
//!                                     Vec<ResolvedPath>
//! ```
//!
//! ## Crate Policy
//!
//! - Resolution never fails: a document without the aliased property
//!   resolves to an empty list.
//! - Invalid definitions are rejected at registry activation, not at
//!   resolve time.
//! - No I/O outside [`manifest`] and [`config`].

pub mod catalog;
pub mod config;
pub mod manifest;
pub mod pattern;
pub mod registry;
pub mod resolve;
pub mod validate;

pub use catalog::AliasCatalog;
pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_RESOLVED_PATHS};
pub use manifest::{
    load_manifest, parse_document, parse_manifest, ManifestError, ManifestFormat, ManifestLoader,
};
pub use pattern::{match_segment, substitute, CompiledPattern, MatchResult};
pub use registry::{AliasRegistry, RegistryBuilder, RegistryError, ResourceAliases};
pub use resolve::{resolve, AliasResolver, ResolvedValue};
pub use validate::{validate_aliases, ValidationViolations, Violation, ViolationKind};
