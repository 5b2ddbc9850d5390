//! Error types for plugin resolution and registries.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by registries and the definition resolver.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Bad registry name or context payload.
    #[error("{0}")]
    InvalidArgument(String),

    /// `set_context` was called on a registry whose context is already set.
    #[error("Can only set context once for registry {0}")]
    AlreadySet(String),

    /// Plugin reference without a name.
    #[error("Plugins should have a name")]
    MissingName,

    /// Plugin reference without a category.
    #[error("Plugins should have a category")]
    MissingCategory,

    /// An explicit require path was not absolute.
    #[error("Require path specified should be an absolute path: {}", .0.display())]
    RelativePathRejected(PathBuf),

    /// The tool or project base path is not absolute.
    #[error("{kind} path should be an absolute path: {}", .path.display())]
    InvalidBasePath { kind: BasePathKind, path: PathBuf },

    /// None of the inferred candidate paths could be loaded.
    #[error("{}", not_found_message(.name, .candidates))]
    PluginNotFound { name: String, candidates: Vec<PathBuf> },

    /// The module at an explicit require path failed to load.
    #[error("Failed to load plugin {name} from {}: {source}", .path.display())]
    ModuleLoadFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// The chosen require path is not absolute.
    #[error("Require path should resolve to an absolute path: {}", .0.display())]
    ResolvedPathNotAbsolute(PathBuf),
}

/// Which base path failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePathKind {
    Tool,
    Project,
}

impl fmt::Display for BasePathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasePathKind::Tool => f.write_str("Tool"),
            BasePathKind::Project => f.write_str("Project"),
        }
    }
}

fn not_found_message(name: &str, candidates: &[PathBuf]) -> String {
    let mut message = format!("Unable to find require path for plugin named {}:", name);
    for candidate in candidates {
        message.push_str("\n\t");
        message.push_str(&candidate.display().to_string());
    }
    message
}

/// Errors produced when loading a plugin module from a path.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Nothing loadable exists at the path.
    #[error("No plugin module at {}", .0.display())]
    NotFound(PathBuf),

    /// The manifest parsed but is not usable.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// The manifest declares an entry point that does not exist.
    #[error("Entry point not found: {}", .0.display())]
    MissingEntryPoint(PathBuf),

    /// Loader-specific failure.
    #[error("{0}")]
    Other(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Result type for module loading.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
