//! # arm-core — Foundational Types for ARM Alias Resolution
//!
//! This crate defines the typed records of the Azure Resource Manager
//! resource-provider schema. Every other crate in the workspace depends on
//! `arm-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Typed records, not attribute bags.** Every manifest field is a
//!    declared struct field with an explicit required-vs-optional marker.
//!    Wire names follow ARM's camelCase convention via serde.
//!
//! 2. **One path grammar.** Declared alias paths and concrete resolved
//!    paths are parsed by the same tokenizer in [`path`], so the resolver
//!    and the reverse index never disagree on what a segment is.
//!
//! 3. **Passive envelopes.** Provider, resource type, and deployment
//!    records carry data in and out of the alias engine; they have no
//!    behaviour beyond field access and small conveniences.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arm-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod alias;
pub mod deployment;
pub mod error;
pub mod path;
pub mod provider;

// Re-export primary types for ergonomic imports.
pub use alias::{Alias, AliasPath, Metadata, Pattern, PatternType, ResolvedPath};
pub use deployment::{
    BasicDependency, DebugSetting, Dependency, DeploymentExtended, DeploymentPropertiesExtended,
    OnErrorDeployment, ParametersLink, ResourceReference, TemplateLink,
};
pub use error::{PathSyntaxError, PatternError};
pub use path::{escape_segment, PathStep, PathToken, PropertyPath, Separator};
pub use provider::{ApiProfile, LocationMapping, Provider, ResourceType, ZoneMapping};
