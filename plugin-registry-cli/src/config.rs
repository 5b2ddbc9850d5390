//! Configuration file loading and management
//!
//! This module handles loading and parsing the `plugreg` configuration from
//! `$XDG_CONFIG_HOME/plugreg/config.toml`. If the configuration file doesn't
//! exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use plugin_registry::{PluginDefinition, RegistryContext};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Registry to populate
    /// Default: the default registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Context handed to the registry
    #[serde(default)]
    pub context: RegistryContext,
    /// Plugins added before any named on the command line
    #[serde(default)]
    pub plugins: Vec<PluginDefinition>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            registry: None,
            context: RegistryContext::default(),
            plugins: Vec::new(),
        }
    }
}

/// Context values given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextOverrides {
    pub default_plugin_category: Option<String>,
    pub tool_path: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the specified path
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// The parsed configuration or an error if loading/parsing fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/plugreg/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "raibid-labs", "plugreg")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    pub fn default_config_content() -> String {
        r#"# plugreg configuration

# Log level: trace, debug, info, warn, error
# Default: "info"
log_level = "info"

# Registry to populate
# Default: "DEFAULT_REGISTRY"
# registry = "my-tool"

[context]
# Category for plugins named without one
# Default: "task"
# defaultPluginCategory = "task"

# Root of the tool; plugins are looked up in <toolPath>/node_modules
# and next to the tool. Default: directory of the plugreg executable
# toolPath = "/opt/my-tool"

# Root of the project; plugins are looked up in <projectPath>/node_modules
# Default: current working directory
# projectPath = "/home/me/project"

# Plugins registered on every run
# [[plugins]]
# name = "foo-plugin"
# category = "generic-plugin"
# requirePath = "/absolute/path/to/foo-plugin"
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            );
        }

        if let Some(name) = &self.registry {
            if name.is_empty() {
                anyhow::bail!("registry must not be empty");
            }
        }

        if let Some(path) = self.context.tool_path() {
            if !path.is_absolute() {
                anyhow::bail!("context.toolPath must be absolute: {}", path.display());
            }
        }
        if let Some(path) = self.context.project_path() {
            if !path.is_absolute() {
                anyhow::bail!("context.projectPath must be absolute: {}", path.display());
            }
        }

        Ok(())
    }

    /// Build the registry context, letting command-line values win.
    pub fn context_with(&self, overrides: ContextOverrides) -> RegistryContext {
        let mut context = self.context.clone();
        if let Some(category) = overrides.default_plugin_category {
            context.default_plugin_category = Some(category);
        }
        if let Some(path) = overrides.tool_path {
            context.tool_path = Some(path);
        }
        if let Some(path) = overrides.project_path {
            context.project_path = Some(path);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(config.registry.is_none());
        assert!(config.plugins.is_empty());
        assert_eq!(config.context, RegistryContext::default());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
log_level = "debug"
registry = "my-tool"

[context]
defaultPluginCategory = "generic"
toolPath = "/opt/my-tool"
projectPath = "/work/project"

[[plugins]]
name = "foo-plugin"
category = "generic-plugin"
requirePath = "/opt/plugins/foo-plugin"

[[plugins]]
name = "bar-plugin"
"#,
        );

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.registry.as_deref(), Some("my-tool"));
        assert_eq!(config.context.default_category(), "generic");
        assert_eq!(config.context.tool_path(), Some(Path::new("/opt/my-tool")));
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(
            config.plugins[0].require_path,
            Some(PathBuf::from("/opt/plugins/foo-plugin"))
        );
        // Category left empty; the registry reports it
        assert!(config.plugins[1].category.is_empty());
    }

    #[test]
    fn test_load_empty_config() {
        let temp_file = write_config("");
        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_content_parses() {
        let config: Config = toml::from_str(&Config::default_config_content()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_relative_tool_path() {
        let mut config = Config::default();
        config.context.tool_path = Some(PathBuf::from("relative/tool"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_registry_name() {
        let mut config = Config::default();
        config.registry = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_context_overrides() {
        let mut config = Config::default();
        config.context.tool_path = Some(PathBuf::from("/from/config"));
        config.context.project_path = Some(PathBuf::from("/project/config"));

        let context = config.context_with(ContextOverrides {
            default_plugin_category: Some("cli".to_string()),
            tool_path: Some(PathBuf::from("/from/cli")),
            project_path: None,
        });

        assert_eq!(context.default_category(), "cli");
        assert_eq!(context.tool_path(), Some(Path::new("/from/cli")));
        assert_eq!(context.project_path(), Some(Path::new("/project/config")));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("plugreg"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
