//! Session factory: one registry, many sessions.

use std::sync::Arc;

use minorm_core::{EntityRegistry, Result};
use minorm_session::{Session, SessionConfig};
use minorm_store::Store;

/// Holds the registry and a cloneable store, handing out independent
/// sessions. Each session gets its own identity map and key allocator;
/// nothing is cached across sessions.
#[derive(Debug, Clone)]
pub struct SessionFactory<S: Store + Clone> {
    store: S,
    registry: Arc<EntityRegistry>,
    config: SessionConfig,
}

impl<S: Store + Clone> SessionFactory<S> {
    pub fn new(store: S, registry: EntityRegistry) -> Self {
        Self::with_config(store, registry, SessionConfig::default())
    }

    pub fn with_config(store: S, registry: EntityRegistry, config: SessionConfig) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            config,
        }
    }

    /// Open a fresh unit of work over a clone of the store connection.
    pub fn open_session(&self) -> Result<Session<S>> {
        Session::open_with(self.store.clone(), Arc::clone(&self.registry), self.config)
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }
}
