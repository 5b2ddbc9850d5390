//! # Registry Store
//!
//! Maps registry names to [`Registry`] instances (multiton). The first
//! lookup of a name creates its registry; later lookups return the same
//! instance until the store is reset.

use crate::registry::Registry;
use plugin_registry_runtime::{ManifestLoader, ModuleLoader, RegistryResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Name used when no registry name is given.
pub const DEFAULT_REGISTRY_NAME: &str = "DEFAULT_REGISTRY";

/// Store of named registries.
///
/// # Example
///
/// ```no_run
/// use plugin_registry::RegistryStore;
/// use std::sync::Arc;
///
/// let store = RegistryStore::default();
/// let tools = store.get(Some("tools")).unwrap();
/// assert!(Arc::ptr_eq(&tools, &store.get(Some("tools")).unwrap()));
/// ```
pub struct RegistryStore {
    loader: Arc<dyn ModuleLoader>,
    registries: RwLock<HashMap<String, Arc<Registry>>>,
}

impl RegistryStore {
    /// Create an empty store whose registries load modules with `loader`.
    pub fn new<L>(loader: L) -> Self
    where
        L: ModuleLoader + 'static,
    {
        Self::with_loader(Arc::new(loader))
    }

    /// Create an empty store backed by [`ManifestLoader`].
    pub fn with_default_loader() -> Self {
        Self::new(ManifestLoader::new())
    }

    /// Create an empty store sharing an existing loader.
    pub fn with_loader(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            registries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the registry with the given name, creating it on first use.
    ///
    /// `None` and the empty name both select [`DEFAULT_REGISTRY_NAME`].
    pub fn get(&self, name: Option<&str>) -> RegistryResult<Arc<Registry>> {
        let name = name
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_REGISTRY_NAME);

        if let Some(registry) = self.read().get(name) {
            debug!("Reusing registry {}", name);
            return Ok(Arc::clone(registry));
        }

        let mut registries = self.write();
        let registry = registries.entry(name.to_string()).or_insert_with(|| {
            info!("Created registry {}", name);
            Arc::new(Registry::new(name, Arc::clone(&self.loader)))
        });

        Ok(Arc::clone(registry))
    }

    /// Forget every registry.
    ///
    /// Callers holding a registry keep it, but later lookups of the same
    /// name create a fresh one.
    pub fn reset(&self) {
        let mut registries = self.write();
        info!("Resetting {} registries", registries.len());
        registries.clear();
    }

    /// Check if a registry with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// List the names of all registries.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store holds no registries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Registry>>> {
        self.registries.read().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned registry store lock");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Registry>>> {
        self.registries.write().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned registry store lock");
            poisoned.into_inner()
        })
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::with_default_loader()
    }
}

impl fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryStore")
            .field("registries", &self.names())
            .finish()
    }
}
