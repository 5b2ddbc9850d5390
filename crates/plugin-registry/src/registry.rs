//! Plugin registry.
//!
//! A registry files resolved plugin definitions under their category and
//! owns the context used to resolve them. The context can be set once;
//! until then the registry works from an empty default context.

use plugin_registry_runtime::{
    resolve_definition, ModuleLoader, PluginReference, RegistryContext, RegistryError,
    RegistryResult, ResolvedPluginDefinition,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

/// Resolved definitions grouped by category, in insertion order.
pub type CategoryIndex = BTreeMap<String, Vec<ResolvedPluginDefinition>>;

/// Context slot that may be filled exactly once.
#[derive(Debug, Clone)]
enum ContextState {
    /// Working default; may pick up inferred base paths.
    Unset(RegistryContext),
    /// Caller-supplied context.
    Set(RegistryContext),
}

impl ContextState {
    fn context(&self) -> &RegistryContext {
        match self {
            ContextState::Unset(context) | ContextState::Set(context) => context,
        }
    }

    fn context_mut(&mut self) -> &mut RegistryContext {
        match self {
            ContextState::Unset(context) | ContextState::Set(context) => context,
        }
    }
}

struct RegistryState {
    context: ContextState,
    categories: CategoryIndex,
}

/// A named registry of resolved plugins.
///
/// Obtain one through [`RegistryStore::get`](crate::RegistryStore::get).
/// Every mutating method returns `&Self` so calls can be chained:
///
/// ```no_run
/// use plugin_registry::{RegistryContext, RegistryStore};
///
/// let store = RegistryStore::default();
/// store
///     .get(Some("tools"))?
///     .set_context(RegistryContext::new().with_default_plugin_category("generic"))?
///     .add(["foo-plugin", "bar-plugin"])?;
/// # Ok::<(), plugin_registry::RegistryError>(())
/// ```
pub struct Registry {
    name: String,
    loader: Arc<dyn ModuleLoader>,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Create an empty registry with an unset context.
    pub fn new(name: impl Into<String>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            name: name.into(),
            loader,
            state: RwLock::new(RegistryState {
                context: ContextState::Unset(RegistryContext::default()),
                categories: CategoryIndex::new(),
            }),
        }
    }

    /// Get the registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the context. May only be called once.
    pub fn set_context(&self, context: RegistryContext) -> RegistryResult<&Self> {
        let mut state = self.write();
        if let ContextState::Set(_) = state.context {
            return Err(RegistryError::AlreadySet(self.name.clone()));
        }

        state.context = ContextState::Set(context);
        info!("Context set for registry {}", self.name);
        Ok(self)
    }

    /// Set the context from a JSON object.
    ///
    /// Anything other than an object is rejected with `InvalidArgument`.
    pub fn set_context_value(&self, value: serde_json::Value) -> RegistryResult<&Self> {
        if !value.is_object() {
            return Err(RegistryError::InvalidArgument("Invalid context".to_string()));
        }

        let context: RegistryContext = serde_json::from_value(value)
            .map_err(|e| RegistryError::InvalidArgument(format!("Invalid context: {}", e)))?;

        self.set_context(context)
    }

    /// Whether the context has been set.
    pub fn is_context_set(&self) -> bool {
        matches!(self.read().context, ContextState::Set(_))
    }

    /// Get the current context.
    pub fn get_context(&self) -> RegistryContext {
        self.read().context.context().clone()
    }

    /// Resolve and add plugins, in order.
    ///
    /// Stops at the first failure. Plugins added before it stay registered.
    pub fn add<I, R>(&self, references: I) -> RegistryResult<&Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<PluginReference>,
    {
        for reference in references {
            self.add_one(reference)?;
        }
        Ok(self)
    }

    /// Resolve and add a single plugin.
    pub fn add_one(&self, reference: impl Into<PluginReference>) -> RegistryResult<&Self> {
        // Resolve without holding the lock; loading may run plugin code.
        let mut context = self.read().context.context().clone();
        let resolved = resolve_definition(reference, &mut context, self.loader.as_ref());

        let mut state = self.write();
        state.context.context_mut().adopt_base_paths(&context);

        let resolved = resolved?;
        info!(
            "Registered plugin {} in category {} from {:?} (registry {})",
            resolved.name, resolved.category, resolved.require_path, self.name
        );
        state
            .categories
            .entry(resolved.category.clone())
            .or_default()
            .push(resolved);

        Ok(self)
    }

    /// Get all plugins of a category, or an empty list for an unknown one.
    pub fn get_all_of_category(&self, category: &str) -> Vec<ResolvedPluginDefinition> {
        self.read()
            .categories
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    /// Get a snapshot of every category.
    pub fn get_full_registry(&self) -> CategoryIndex {
        self.read().categories.clone()
    }

    /// Get the populated category names.
    pub fn categories(&self) -> Vec<String> {
        self.read().categories.keys().cloned().collect()
    }

    /// Get the total number of registered plugins.
    pub fn count(&self) -> usize {
        self.read().categories.values().map(Vec::len).sum()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned lock for registry {}", self.name);
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned lock for registry {}", self.name);
            poisoned.into_inner()
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("context", &state.context)
            .field("categories", &state.categories)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_registry_runtime::{
        LoadError, LoadResult, PluginDefinition, PluginManifest, PluginModule,
    };
    use std::path::{Path, PathBuf};

    /// Loads anything whose final path component starts with "ok-".
    fn prefix_loader(path: &Path) -> LoadResult<PluginModule> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with("ok-") {
            let manifest = PluginManifest::parse(&format!("[plugin]\nname = \"{}\"\n", name))?;
            Ok(PluginModule::new(path, manifest))
        } else {
            Err(LoadError::NotFound(path.to_path_buf()))
        }
    }

    fn registry() -> Registry {
        let registry = Registry::new("test", Arc::new(prefix_loader));
        registry
            .set_context(
                RegistryContext::new()
                    .with_tool_path("/opt/tool")
                    .with_project_path("/work/project"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_new_registry() {
        let registry = Registry::new("fresh", Arc::new(prefix_loader));
        assert_eq!(registry.name(), "fresh");
        assert_eq!(registry.count(), 0);
        assert!(!registry.is_context_set());
        assert_eq!(registry.get_context(), RegistryContext::default());
        assert!(registry.get_full_registry().is_empty());
    }

    #[test]
    fn test_set_context_once() {
        let registry = Registry::new("foo", Arc::new(prefix_loader));
        registry
            .set_context(RegistryContext::new().with_default_plugin_category("generic"))
            .unwrap();
        assert!(registry.is_context_set());

        let err = registry.set_context(RegistryContext::new()).unwrap_err();
        assert_eq!(err.to_string(), "Can only set context once for registry foo");
        assert_eq!(registry.get_context().default_category(), "generic");
    }

    #[test]
    fn test_set_context_value() {
        let registry = Registry::new("foo", Arc::new(prefix_loader));

        let err = registry.set_context_value(serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert!(!registry.is_context_set());

        registry
            .set_context_value(serde_json::json!({ "myOption": 123 }))
            .unwrap();
        assert_eq!(registry.get_context().extra["myOption"], serde_json::json!(123));

        let err = registry
            .set_context_value(serde_json::json!({ "myOption": 456 }))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadySet(_)));
    }

    #[test]
    fn test_add_and_query() {
        let registry = registry();
        registry
            .add_one(PluginDefinition::new("ok-foo", "generic"))
            .unwrap()
            .add_one("ok-bar")
            .unwrap();

        let generic = registry.get_all_of_category("generic");
        assert_eq!(generic.len(), 1);
        assert_eq!(generic[0].require_path, PathBuf::from("/opt/tool/node_modules/ok-foo"));

        let tasks = registry.get_all_of_category("task");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "ok-bar");

        assert!(registry.get_all_of_category("nonexistent").is_empty());
        assert_eq!(registry.categories(), vec!["generic".to_string(), "task".to_string()]);
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let registry = registry();
        registry.add(["ok-foo", "ok-foo"]).unwrap();
        assert_eq!(registry.get_all_of_category("task").len(), 2);
    }

    #[test]
    fn test_add_fails_fast_without_rollback() {
        let registry = registry();
        let err = registry.add(["ok-first", "missing", "ok-third"]).unwrap_err();

        assert!(matches!(err, RegistryError::PluginNotFound { .. }));
        let tasks = registry.get_all_of_category("task");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "ok-first");
    }

    #[test]
    fn test_inferred_paths_cached_before_context_set() {
        let registry = Registry::new("lazy", Arc::new(prefix_loader));
        let _ = registry.add_one("missing");

        let context = registry.get_context();
        assert!(context.tool_path().is_some());
        assert!(context.project_path().is_some());
        assert!(!registry.is_context_set());

        // Caching inferred paths does not lock the context
        registry.set_context(RegistryContext::new()).unwrap();
    }

    #[test]
    fn test_snapshot_does_not_alias_state() {
        let registry = registry();
        registry.add_one("ok-foo").unwrap();

        let mut snapshot = registry.get_all_of_category("task");
        snapshot.clear();

        assert_eq!(registry.get_all_of_category("task").len(), 1);
    }
}
