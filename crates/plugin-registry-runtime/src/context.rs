//! Registry context.
//!
//! The context controls how bare plugin names are turned into candidate
//! paths. Unset values are inferred during resolution and cached back into
//! the context so later resolutions reuse them.

use crate::definition::DEFAULT_PLUGIN_CATEGORY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings consumed by the definition resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryContext {
    /// Category for bare-name references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_plugin_category: Option<String>,

    /// Root of the tool that owns the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_path: Option<PathBuf>,

    /// Root of the project the tool runs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,

    /// Keys the resolver does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RegistryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default plugin category.
    pub fn with_default_plugin_category(mut self, category: impl Into<String>) -> Self {
        self.default_plugin_category = Some(category.into());
        self
    }

    /// Set the tool path.
    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = Some(path.into());
        self
    }

    /// Set the project path.
    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    /// The category bare names are filed under.
    ///
    /// An empty configured category falls back to the default.
    pub fn default_category(&self) -> &str {
        self.default_plugin_category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_PLUGIN_CATEGORY)
    }

    /// Tool path, treating an empty path as unset.
    pub fn tool_path(&self) -> Option<&Path> {
        self.tool_path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Project path, treating an empty path as unset.
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Copy inferred base paths from `other` into any slots still unset here.
    pub fn adopt_base_paths(&mut self, other: &RegistryContext) {
        if self.tool_path().is_none() {
            if let Some(path) = other.tool_path() {
                self.tool_path = Some(path.to_path_buf());
            }
        }
        if self.project_path().is_none() {
            if let Some(path) = other.project_path() {
                self.project_path = Some(path.to_path_buf());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category() {
        assert_eq!(RegistryContext::new().default_category(), "task");
        assert_eq!(
            RegistryContext::new()
                .with_default_plugin_category("")
                .default_category(),
            "task"
        );
        assert_eq!(
            RegistryContext::new()
                .with_default_plugin_category("generic")
                .default_category(),
            "generic"
        );
    }

    #[test]
    fn test_deserialize_camel_case_keys() {
        let context: RegistryContext = serde_json::from_value(serde_json::json!({
            "defaultPluginCategory": "generic",
            "toolPath": "/opt/tool",
            "projectPath": "/work/project",
            "myOption": 123
        }))
        .unwrap();

        assert_eq!(context.default_category(), "generic");
        assert_eq!(context.tool_path(), Some(Path::new("/opt/tool")));
        assert_eq!(context.project_path(), Some(Path::new("/work/project")));
        assert_eq!(context.extra["myOption"], serde_json::json!(123));
    }

    #[test]
    fn test_adopt_base_paths_keeps_existing() {
        let mut context = RegistryContext::new().with_tool_path("/explicit/tool");
        let inferred = RegistryContext::new()
            .with_tool_path("/inferred/tool")
            .with_project_path("/inferred/project");

        context.adopt_base_paths(&inferred);

        assert_eq!(context.tool_path(), Some(Path::new("/explicit/tool")));
        assert_eq!(context.project_path(), Some(Path::new("/inferred/project")));
    }
}
