//! Rendering of registry contents.

use anyhow::Result;
use plugin_registry::CategoryIndex;
use std::fmt::{self, Write};

/// Render a registry as an indented listing grouped by category.
pub fn render_text(registry_name: &str, index: &CategoryIndex) -> Result<String> {
    let mut out = String::new();
    write_text(&mut out, registry_name, index)?;
    Ok(out)
}

fn write_text(out: &mut impl Write, registry_name: &str, index: &CategoryIndex) -> fmt::Result {
    let total: usize = index.values().map(Vec::len).sum();
    writeln!(out, "Registry {} ({} plugins)", registry_name, total)?;

    for (category, plugins) in index {
        writeln!(out, "  {}:", category)?;
        for plugin in plugins {
            let version = plugin
                .module
                .manifest
                .plugin
                .version
                .as_deref()
                .map(|v| format!(" v{}", v))
                .unwrap_or_default();
            writeln!(
                out,
                "    {}{} -> {}",
                plugin.name,
                version,
                plugin.require_path.display()
            )?;
        }
    }

    Ok(())
}

/// Render a registry as pretty-printed JSON.
pub fn render_json(index: &CategoryIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(index)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_registry_runtime::{PluginManifest, PluginModule, ResolvedPluginDefinition};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn sample_index() -> CategoryIndex {
        let manifest =
            PluginManifest::parse("[plugin]\nname = \"foo\"\nversion = \"1.0.0\"\n").unwrap();
        let resolved = ResolvedPluginDefinition {
            name: "foo".to_string(),
            category: "task".to_string(),
            require_path: PathBuf::from("/opt/tool/node_modules/foo"),
            extra: serde_json::Map::new(),
            module: Arc::new(PluginModule::new("/opt/tool/node_modules/foo", manifest)),
        };

        let mut index = CategoryIndex::new();
        index.insert("task".to_string(), vec![resolved]);
        index
    }

    #[test]
    fn test_render_text() {
        let text = render_text("tools", &sample_index()).unwrap();
        assert_eq!(
            text,
            "Registry tools (1 plugins)\n  task:\n    foo v1.0.0 -> /opt/tool/node_modules/foo\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let text = render_text("empty", &CategoryIndex::new()).unwrap();
        assert_eq!(text, "Registry empty (0 plugins)\n");
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample_index()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["task"][0]["name"], "foo");
        assert_eq!(value["task"][0]["requirePath"], "/opt/tool/node_modules/foo");
        assert_eq!(value["task"][0]["module"]["manifest"]["plugin"]["version"], "1.0.0");
    }
}
