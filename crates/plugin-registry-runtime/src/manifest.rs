//! Plugin manifest parsing.
//!
//! A plugin module is described by a `plugin.toml` file with its metadata,
//! an optional entry point and free-form configuration.

use crate::error::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// File name of the manifest inside a plugin directory.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Plugin manifest structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin metadata.
    pub plugin: PluginMetadata,

    /// Custom configuration key-value pairs.
    #[serde(default)]
    pub config: HashMap<String, toml::Value>,
}

/// Plugin metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin name.
    pub name: String,

    /// Version string.
    #[serde(default)]
    pub version: Option<String>,

    /// Plugin description.
    #[serde(default)]
    pub description: Option<String>,

    /// Category the plugin advertises for itself.
    #[serde(default)]
    pub category: Option<String>,

    /// Entry point file, relative to the manifest.
    #[serde(default)]
    pub entry_point: Option<String>,
}

impl PluginManifest {
    /// Load a manifest from a TOML file.
    pub fn from_file(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a TOML string.
    pub fn parse(content: &str) -> LoadResult<Self> {
        let manifest: PluginManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> LoadResult<()> {
        if self.plugin.name.trim().is_empty() {
            return Err(LoadError::InvalidManifest(
                "Plugin name cannot be empty".to_string(),
            ));
        }

        if let Some(entry_point) = &self.plugin.entry_point {
            if entry_point.is_empty() || Path::new(entry_point).is_absolute() {
                return Err(LoadError::InvalidManifest(format!(
                    "Entry point must be a relative file name, got '{}'",
                    entry_point
                )));
            }
        }

        Ok(())
    }

    /// Get the plugin name.
    pub fn name(&self) -> &str {
        &self.plugin.name
    }

    /// Get the declared entry point, if any.
    pub fn entry_point(&self) -> Option<&str> {
        self.plugin.entry_point.as_deref()
    }
}
