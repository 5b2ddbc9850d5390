//! Module loading.
//!
//! The resolver never touches the filesystem itself: it asks a
//! [`ModuleLoader`] to load each candidate path and treats any error as
//! "not here". [`ManifestLoader`] is the stock implementation, which
//! accepts either a plugin directory containing `plugin.toml` or a path to
//! a manifest file.

use crate::error::{LoadError, LoadResult};
use crate::manifest::{PluginManifest, MANIFEST_FILE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A successfully loaded plugin module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginModule {
    /// Path the module was loaded from.
    pub path: PathBuf,

    /// Parsed manifest.
    pub manifest: PluginManifest,

    /// Absolute path to the entry point file, when the manifest declares one.
    pub entry_point: Option<PathBuf>,
}

impl PluginModule {
    /// Build a module handle from an already parsed manifest.
    pub fn new(path: impl Into<PathBuf>, manifest: PluginManifest) -> Self {
        Self {
            path: path.into(),
            manifest,
            entry_point: None,
        }
    }

    /// Get the name declared in the manifest.
    pub fn name(&self) -> &str {
        self.manifest.name()
    }
}

/// Capability to load a plugin module from an absolute path.
pub trait ModuleLoader: Send + Sync {
    /// Load the module at `path`, or fail if nothing loadable lives there.
    fn load(&self, path: &Path) -> LoadResult<PluginModule>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&Path) -> LoadResult<PluginModule> + Send + Sync,
{
    fn load(&self, path: &Path) -> LoadResult<PluginModule> {
        self(path)
    }
}

/// Loads plugins described by `plugin.toml` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    /// Create a new manifest loader.
    pub fn new() -> Self {
        Self
    }

    /// Locate the manifest file for a module path.
    fn manifest_path(path: &Path) -> LoadResult<PathBuf> {
        if path.is_dir() {
            let manifest_path = path.join(MANIFEST_FILE);
            if manifest_path.is_file() {
                return Ok(manifest_path);
            }
        } else if path.is_file() {
            return Ok(path.to_path_buf());
        }

        Err(LoadError::NotFound(path.to_path_buf()))
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&self, path: &Path) -> LoadResult<PluginModule> {
        let manifest_path = Self::manifest_path(path)?;
        trace!("Reading plugin manifest {:?}", manifest_path);

        let manifest = PluginManifest::from_file(&manifest_path)?;

        let entry_point = match manifest.entry_point() {
            Some(entry) => {
                let base = manifest_path.parent().unwrap_or(path);
                let entry_path = base.join(entry);
                if !entry_path.is_file() {
                    return Err(LoadError::MissingEntryPoint(entry_path));
                }
                Some(entry_path)
            }
            None => None,
        };

        Ok(PluginModule {
            path: path.to_path_buf(),
            manifest,
            entry_point,
        })
    }
}
