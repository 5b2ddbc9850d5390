//! Plugin references and definitions.
//!
//! Callers name a plugin either with a bare string or with a
//! [`PluginDefinition`]. Resolution turns either into a
//! [`ResolvedPluginDefinition`] that carries the path it was loaded from
//! and the loaded module.

use crate::loader::PluginModule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Category used for bare-name references when the context does not set one.
pub const DEFAULT_PLUGIN_CATEGORY: &str = "task";

/// A caller-supplied plugin reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginReference {
    /// Bare plugin name, filed under the default category.
    Name(String),
    /// Structured definition.
    Definition(PluginDefinition),
}

impl From<&str> for PluginReference {
    fn from(name: &str) -> Self {
        PluginReference::Name(name.to_string())
    }
}

impl From<String> for PluginReference {
    fn from(name: String) -> Self {
        PluginReference::Name(name)
    }
}

impl From<PluginDefinition> for PluginReference {
    fn from(definition: PluginDefinition) -> Self {
        PluginReference::Definition(definition)
    }
}

impl From<&PluginDefinition> for PluginReference {
    fn from(definition: &PluginDefinition) -> Self {
        PluginReference::Definition(definition.clone())
    }
}

/// Structured plugin definition.
///
/// An empty `name` or `category` counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDefinition {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: String,

    /// Explicit absolute path; disables candidate probing.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "require_path")]
    pub require_path: Option<PathBuf>,

    /// Any other caller-defined fields, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PluginDefinition {
    /// Create a definition with a name and category.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Set the plugin name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the plugin category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set an explicit require path.
    pub fn with_require_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.require_path = Some(path.into());
        self
    }

    /// Attach an extra field.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A definition whose module was found and loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPluginDefinition {
    pub name: String,
    pub category: String,

    /// Absolute path the module was loaded from.
    pub require_path: PathBuf,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,

    /// The loaded module.
    pub module: Arc<PluginModule>,
}

impl ResolvedPluginDefinition {
    /// The definition this was resolved from, with the require path filled in.
    pub fn definition(&self) -> PluginDefinition {
        PluginDefinition {
            name: self.name.clone(),
            category: self.category.clone(),
            require_path: Some(self.require_path.clone()),
            extra: self.extra.clone(),
        }
    }
}
