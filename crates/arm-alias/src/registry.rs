//! # Alias Registry
//!
//! Per-resource-type alias sets with name lookup, reverse path lookup,
//! validation, and resolution.
//!
//! ## Lifecycle
//!
//! A [`RegistryBuilder`] stages alias sets (`register` rejects duplicate
//! names), reports violations through `validate`, and activates an
//! immutable [`AliasRegistry`] with `build` only when every staged set is
//! clean. A registry is never mutated after activation; re-registering
//! means building a new one (see [`AliasCatalog`](crate::AliasCatalog)).
//!
//! The reverse index (declared path → aliases) is built lazily on the first
//! reverse query and lives as long as the registry instance, so any
//! rebuild starts from a fresh index.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use arm_core::path::tokenize;
use arm_core::{Alias, PropertyPath, Provider, ResolvedPath, ResourceType};
use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::resolve::{AliasResolver, ResolvedValue};
use crate::validate::{validate_aliases, ValidationViolations};

/// Error raised by registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Alias definitions violate the schema invariants; the registry was
    /// not activated.
    #[error("alias definitions for '{resource_type}' are invalid:\n{violations}")]
    AliasDefinition {
        /// Resource type whose aliases failed validation.
        resource_type: String,
        /// Every finding for that resource type.
        violations: ValidationViolations,
    },

    /// Two aliases of one resource type share a name.
    #[error("duplicate alias '{name}' in resource type '{resource_type}'")]
    DuplicateAlias {
        /// Resource type being registered.
        resource_type: String,
        /// The repeated alias name.
        name: String,
    },

    /// No alias of that name is registered for the resource type.
    #[error("alias '{name}' not found for resource type '{resource_type}'")]
    AliasNotFound {
        /// Resource type queried.
        resource_type: String,
        /// Alias name queried.
        name: String,
    },
}

/// Declared paths of every alias, for reverse lookup.
#[derive(Debug, Default)]
struct ReverseIndex {
    /// Declared path string → alias positions.
    exact: HashMap<String, Vec<usize>>,
    /// Parsed declared paths for wildcard matching.
    templates: Vec<(PropertyPath, usize)>,
}

impl ReverseIndex {
    fn build(aliases: &[Alias]) -> Self {
        let mut index = Self::default();
        for (position, alias) in aliases.iter().enumerate() {
            let declared = alias
                .paths
                .iter()
                .map(|p| p.path.as_str())
                .chain((!alias.default_path.is_empty()).then_some(alias.default_path.as_str()));
            for path in declared {
                let entry = index.exact.entry(path.to_string()).or_default();
                if entry.last() == Some(&position) {
                    continue;
                }
                entry.push(position);
                if let Ok(parsed) = PropertyPath::parse(path) {
                    index.templates.push((parsed, position));
                }
            }
        }
        index
    }

    fn lookup(&self, concrete: &str) -> Vec<usize> {
        let mut hits = self.exact.get(concrete).cloned().unwrap_or_default();
        if let Ok(tokens) = tokenize(concrete) {
            hits.extend(
                self.templates
                    .iter()
                    .filter(|(template, _)| template.matches_concrete(&tokens))
                    .map(|(_, position)| *position),
            );
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

/// The aliases of one resource type.
#[derive(Debug)]
pub struct ResourceAliases {
    resource_type: String,
    aliases: Vec<Alias>,
    by_name: HashMap<String, usize>,
    property_schema: Option<Value>,
    reverse: OnceLock<ReverseIndex>,
}

impl Clone for ResourceAliases {
    /// Clones the definitions; the reverse index starts empty.
    fn clone(&self) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            aliases: self.aliases.clone(),
            by_name: self.by_name.clone(),
            property_schema: self.property_schema.clone(),
            reverse: OnceLock::new(),
        }
    }
}

impl ResourceAliases {
    fn new(
        resource_type: String,
        aliases: Vec<Alias>,
        property_schema: Option<Value>,
    ) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(aliases.len());
        for (position, alias) in aliases.iter().enumerate() {
            if by_name.insert(alias.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateAlias {
                    resource_type,
                    name: alias.name.clone(),
                });
            }
        }
        Ok(Self {
            resource_type,
            aliases,
            by_name,
            property_schema,
            reverse: OnceLock::new(),
        })
    }

    /// Fully qualified resource type name.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Aliases in registration order.
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// JSON Schema of the resource body, if one was registered.
    pub fn property_schema(&self) -> Option<&Value> {
        self.property_schema.as_ref()
    }

    /// Look up an alias by name.
    pub fn get(&self, name: &str) -> Option<&Alias> {
        self.by_name.get(name).map(|&i| &self.aliases[i])
    }

    /// Aliases declaring a path that `concrete_path` is an instance of.
    pub fn lookup_by_path(&self, concrete_path: &str) -> Vec<&Alias> {
        let index = self.reverse.get_or_init(|| {
            tracing::debug!(resource_type = %self.resource_type, "building reverse alias index");
            ReverseIndex::build(&self.aliases)
        });
        index
            .lookup(concrete_path)
            .into_iter()
            .map(|i| &self.aliases[i])
            .collect()
    }

    fn validate(&self, config: &EngineConfig) -> ValidationViolations {
        let schema = self
            .property_schema
            .as_ref()
            .filter(|_| config.check_property_schema);
        validate_aliases(&self.aliases, schema)
    }
}

/// Stages alias sets and activates an [`AliasRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    staged: BTreeMap<String, ResourceAliases>,
    config: EngineConfig,
}

impl RegistryBuilder {
    /// An empty builder with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            staged: BTreeMap::new(),
            config,
        }
    }

    /// Stage the aliases of `resource_type`, replacing any set staged before.
    ///
    /// A property schema staged earlier for the same resource type is kept.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateAlias`] when two aliases share a name; the
    /// previously staged set is left untouched.
    pub fn register(
        &mut self,
        resource_type: impl Into<String>,
        aliases: impl IntoIterator<Item = Alias>,
    ) -> Result<(), RegistryError> {
        let resource_type = resource_type.into();
        let schema = self
            .staged
            .get(&resource_type)
            .and_then(|set| set.property_schema.clone());
        self.stage(resource_type, aliases.into_iter().collect(), schema)
    }

    /// Stage a manifest resource type under `"{namespace}/{resourceType}"`.
    pub fn register_resource_type(
        &mut self,
        namespace: &str,
        resource_type: &ResourceType,
    ) -> Result<(), RegistryError> {
        self.stage(
            format!("{namespace}/{}", resource_type.resource_type),
            resource_type.aliases.clone(),
            resource_type.property_schema.clone(),
        )
    }

    /// Stage every resource type of a provider manifest.
    pub fn register_provider(&mut self, provider: &Provider) -> Result<(), RegistryError> {
        for resource_type in &provider.resource_types {
            self.register_resource_type(&provider.namespace, resource_type)?;
        }
        Ok(())
    }

    /// Drop a staged resource type. Returns whether it was staged.
    pub fn remove(&mut self, resource_type: &str) -> bool {
        self.staged.remove(resource_type).is_some()
    }

    /// Report violations for a staged resource type.
    ///
    /// Unknown resource types have no violations.
    pub fn validate(&self, resource_type: &str) -> ValidationViolations {
        self.staged
            .get(resource_type)
            .map(|set| set.validate(&self.config))
            .unwrap_or_default()
    }

    /// Staged resource type names, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.staged.keys().map(String::as_str)
    }

    /// Activate the staged definitions.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AliasDefinition`] for the first resource type (in
    /// name order) with violations.
    pub fn build(self) -> Result<AliasRegistry, RegistryError> {
        for (resource_type, set) in &self.staged {
            let violations = set.validate(&self.config);
            if !violations.is_empty() {
                tracing::warn!(
                    resource_type = %resource_type,
                    violations = violations.len(),
                    "alias definitions rejected"
                );
                return Err(RegistryError::AliasDefinition {
                    resource_type: resource_type.clone(),
                    violations,
                });
            }
        }

        let alias_count: usize = self.staged.values().map(|set| set.aliases.len()).sum();
        tracing::info!(
            resource_types = self.staged.len(),
            aliases = alias_count,
            "alias registry activated"
        );
        Ok(AliasRegistry {
            resource_types: self.staged,
            config: self.config,
        })
    }

    fn stage(
        &mut self,
        resource_type: String,
        aliases: Vec<Alias>,
        property_schema: Option<Value>,
    ) -> Result<(), RegistryError> {
        let set = ResourceAliases::new(resource_type.clone(), aliases, property_schema)?;
        tracing::debug!(
            resource_type = %resource_type,
            aliases = set.aliases.len(),
            "staged alias set"
        );
        self.staged.insert(resource_type, set);
        Ok(())
    }
}

/// An activated, immutable set of alias definitions.
///
/// `AliasRegistry` is `Send + Sync`; lookups and resolution need no locking.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    resource_types: BTreeMap<String, ResourceAliases>,
    config: EngineConfig,
}

impl AliasRegistry {
    /// A builder with the given configuration.
    pub fn builder(config: EngineConfig) -> RegistryBuilder {
        RegistryBuilder::new(config)
    }

    /// A builder seeded with this registry's definitions, for re-registration.
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            staged: self.resource_types.clone(),
            config: self.config.clone(),
        }
    }

    /// The configuration the registry was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resource_types.keys().map(String::as_str)
    }

    /// Number of registered resource types.
    pub fn len(&self) -> usize {
        self.resource_types.len()
    }

    /// Whether no resource type is registered.
    pub fn is_empty(&self) -> bool {
        self.resource_types.is_empty()
    }

    /// The alias set of a resource type.
    pub fn get(&self, resource_type: &str) -> Option<&ResourceAliases> {
        self.resource_types.get(resource_type)
    }

    /// Look up an alias by name.
    pub fn lookup_by_name(&self, resource_type: &str, name: &str) -> Option<&Alias> {
        self.get(resource_type)?.get(name)
    }

    /// Aliases of `resource_type` whose declared paths match `concrete_path`,
    /// in registration order.
    pub fn lookup_by_path(&self, resource_type: &str, concrete_path: &str) -> Vec<&Alias> {
        self.get(resource_type)
            .map(|set| set.lookup_by_path(concrete_path))
            .unwrap_or_default()
    }

    /// Re-run validation for a registered resource type.
    pub fn validate(&self, resource_type: &str) -> ValidationViolations {
        self.get(resource_type)
            .map(|set| set.validate(&self.config))
            .unwrap_or_default()
    }

    /// Look up an alias and resolve it against `body`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AliasNotFound`] when the alias is not registered.
    pub fn resolve(
        &self,
        resource_type: &str,
        alias_name: &str,
        api_version: &str,
        body: &Value,
    ) -> Result<Vec<ResolvedPath>, RegistryError> {
        let alias = self.require(resource_type, alias_name)?;
        Ok(AliasResolver::new(&self.config).resolve(alias, api_version, body))
    }

    /// Look up an alias and return the values it resolves to in `body`.
    pub fn evaluate<'v>(
        &self,
        resource_type: &str,
        alias_name: &str,
        api_version: &str,
        body: &'v Value,
    ) -> Result<Vec<ResolvedValue<'v>>, RegistryError> {
        let alias = self.require(resource_type, alias_name)?;
        Ok(AliasResolver::new(&self.config).evaluate(alias, api_version, body))
    }

    fn require(&self, resource_type: &str, alias_name: &str) -> Result<&Alias, RegistryError> {
        self.lookup_by_name(resource_type, alias_name)
            .ok_or_else(|| RegistryError::AliasNotFound {
                resource_type: resource_type.to_string(),
                name: alias_name.to_string(),
            })
    }
}
