//! # plugin-registry
//!
//! Named, categorized plugin registries.
//!
//! This crate provides:
//!
//! - [`RegistryStore`], which hands out one [`Registry`] per name
//! - [`Registry`], which resolves plugin references and files them by category
//! - A process-wide store behind [`get`] and [`reset`]
//!
//! ## Usage
//!
//! ```no_run
//! use plugin_registry::{PluginDefinition, RegistryContext};
//!
//! let registry = plugin_registry::get(Some("build-tool"))?;
//! registry
//!     .set_context(RegistryContext::new().with_tool_path("/opt/build-tool"))?
//!     .add_one("lint")?
//!     .add_one(PluginDefinition::new("minify", "transform"))?;
//!
//! for plugin in registry.get_all_of_category("task") {
//!     println!("{} -> {}", plugin.name, plugin.require_path.display());
//! }
//! # Ok::<(), plugin_registry::RegistryError>(())
//! ```

pub mod registry;
pub mod store;

pub use plugin_registry_runtime::{
    LoadError, ManifestLoader, ModuleLoader, PluginDefinition, PluginModule, PluginReference,
    RegistryContext, RegistryError, RegistryResult, ResolvedPluginDefinition,
};
pub use registry::{CategoryIndex, Registry};
pub use store::{RegistryStore, DEFAULT_REGISTRY_NAME};

use std::sync::{Arc, OnceLock};

static GLOBAL_STORE: OnceLock<RegistryStore> = OnceLock::new();

/// The process-wide store, using [`ManifestLoader`].
pub fn global() -> &'static RegistryStore {
    GLOBAL_STORE.get_or_init(RegistryStore::default)
}

/// Get a registry from the process-wide store.
pub fn get(name: Option<&str>) -> RegistryResult<Arc<Registry>> {
    global().get(name)
}

/// Forget every registry in the process-wide store.
pub fn reset() {
    global().reset()
}
