//! # Alias Catalog
//!
//! A shared handle to the active [`AliasRegistry`].
//!
//! Readers take an `Arc` snapshot and resolve against it without holding
//! any lock. Writers rebuild a fresh registry from the current one and
//! swap it in only when activation succeeds, so a reader observes either
//! the old definitions or the new ones, never a mix. Writers are
//! serialized; readers never wait on a rebuild.

use std::sync::Arc;

use arm_core::{Alias, Provider};
use parking_lot::{Mutex, RwLock};

use crate::registry::{AliasRegistry, RegistryBuilder, RegistryError};

/// Concurrent holder of the active alias registry.
#[derive(Debug, Default)]
pub struct AliasCatalog {
    current: RwLock<Arc<AliasRegistry>>,
    writer: Mutex<()>,
}

impl AliasCatalog {
    /// A catalog serving `registry`.
    pub fn new(registry: AliasRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
            writer: Mutex::new(()),
        }
    }

    /// The registry active at the time of the call.
    pub fn snapshot(&self) -> Arc<AliasRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Replace the aliases of one resource type.
    ///
    /// On error the active registry is unchanged.
    pub fn register(
        &self,
        resource_type: &str,
        aliases: Vec<Alias>,
    ) -> Result<Arc<AliasRegistry>, RegistryError> {
        self.update(|builder| builder.register(resource_type, aliases))
    }

    /// Replace every resource type declared by a provider manifest.
    pub fn load_provider(&self, provider: &Provider) -> Result<Arc<AliasRegistry>, RegistryError> {
        self.update(|builder| builder.register_provider(provider))
    }

    /// Swap in a registry built elsewhere. Returns the one it replaced.
    pub fn publish(&self, registry: AliasRegistry) -> Arc<AliasRegistry> {
        let _guard = self.writer.lock();
        let next = Arc::new(registry);
        tracing::info!(resource_types = next.len(), "alias registry published");
        std::mem::replace(&mut *self.current.write(), next)
    }

    fn update<F>(&self, stage: F) -> Result<Arc<AliasRegistry>, RegistryError>
    where
        F: FnOnce(&mut RegistryBuilder) -> Result<(), RegistryError>,
    {
        let _guard = self.writer.lock();
        let mut builder = self.snapshot().to_builder();
        stage(&mut builder)?;
        let next = Arc::new(builder.build()?);
        *self.current.write() = Arc::clone(&next);
        tracing::info!(resource_types = next.len(), "alias registry published");
        Ok(next)
    }
}
