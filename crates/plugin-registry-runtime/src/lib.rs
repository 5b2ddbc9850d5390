//! # plugin-registry-runtime
//!
//! Plugin lookup for plugin registries.
//!
//! This crate provides:
//! - Plugin references and definitions
//! - The registry context that drives path inference
//! - Module loading behind the [`ModuleLoader`] capability
//! - Plugin manifest parsing
//! - Definition resolution by ordered candidate probing
//!
//! ## Plugin Structure
//!
//! With the stock [`ManifestLoader`], a plugin is a directory containing:
//! - `plugin.toml` - Plugin metadata and configuration
//! - an optional entry point file named by the manifest
//!
//! ## Lookup
//!
//! Plugins without an explicit path are looked up in the tool's
//! `node_modules`, then the project's `node_modules`, then next to the tool.

pub mod context;
pub mod definition;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod paths;
pub mod resolver;

pub use context::RegistryContext;
pub use definition::{
    PluginDefinition, PluginReference, ResolvedPluginDefinition, DEFAULT_PLUGIN_CATEGORY,
};
pub use error::{BasePathKind, LoadError, LoadResult, RegistryError, RegistryResult};
pub use loader::{ManifestLoader, ModuleLoader, PluginModule};
pub use manifest::{PluginManifest, PluginMetadata, MANIFEST_FILE};
pub use resolver::{candidate_paths, resolve_definition};
