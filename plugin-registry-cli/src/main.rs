//! # plugreg
//!
//! Resolve plugins into a registry and print what was found.
//!
//! Plugins come from the `[[plugins]]` table of the configuration file
//! followed by any names given on the command line. Each one is looked up
//! in the tool's `node_modules`, the project's `node_modules` and next to
//! the tool, in that order.
//!
//! ## Running
//!
//! ```bash
//! # Resolve two plugins against the current project
//! plugreg --tool-path /opt/my-tool foo-plugin bar-plugin
//!
//! # Print the registry as JSON, with debug logging
//! RUST_LOG=debug plugreg --json foo-plugin
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use plugin_registry::PluginReference;
use plugin_registry_cli::config::{Config, ContextOverrides};
use plugin_registry_cli::report;
use plugin_registry_runtime::paths;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Resolve plugins into a registry and list them.
#[derive(Debug, Parser)]
#[command(name = "plugreg", version, about)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/plugreg/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registry name
    #[arg(long)]
    registry: Option<String>,

    /// Category for plugins named without one
    #[arg(long)]
    category: Option<String>,

    /// Tool root directory
    #[arg(long)]
    tool_path: Option<PathBuf>,

    /// Project root directory
    #[arg(long)]
    project_path: Option<PathBuf>,

    /// Print the registry as JSON
    #[arg(long)]
    json: bool,

    /// Plugin names to add
    plugins: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match &cli.config {
        Some(path) => (Config::load(path)?, None),
        None => match Config::load_default() {
            Ok(cfg) => (cfg, None),
            Err(e) => (Config::default(), Some(e)),
        },
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("Failed to load config, using defaults: {:#}", e);
    }

    let overrides = ContextOverrides {
        default_plugin_category: cli.category.clone(),
        tool_path: cli.tool_path.as_deref().map(absolutize).transpose()?,
        project_path: cli.project_path.as_deref().map(absolutize).transpose()?,
    };
    let context = config.context_with(overrides);

    let registry_name = cli.registry.as_deref().or(config.registry.as_deref());
    let registry = plugin_registry::get(registry_name)?;
    registry.set_context(context)?;

    let references = config
        .plugins
        .iter()
        .cloned()
        .map(PluginReference::from)
        .chain(cli.plugins.iter().cloned().map(PluginReference::from));
    registry
        .add(references)
        .with_context(|| format!("Failed to populate registry {}", registry.name()))?;

    info!(
        "Registry {} holds {} plugin(s) in {} categories",
        registry.name(),
        registry.count(),
        registry.categories().len()
    );

    let index = registry.get_full_registry();
    if cli.json {
        println!("{}", report::render_json(&index)?);
    } else {
        print!("{}", report::render_text(registry.name(), &index)?);
    }

    Ok(())
}

/// Make a command-line path absolute against the working directory.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(paths::normalize(path));
    }
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    Ok(paths::normalize(&cwd.join(path)))
}
