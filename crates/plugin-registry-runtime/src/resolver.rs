//! Plugin definition resolution.
//!
//! A definition without an explicit `require_path` is looked up in the
//! following locations (in order):
//!
//! 1. `<toolPath>/node_modules/<name>` (the tool's own dependencies)
//! 2. `<projectPath>/node_modules/<name>` (the project's dependencies)
//! 3. `<toolPath>/../<name>` (sibling of the tool, e.g. a global install)
//!
//! The first candidate that loads wins.

use crate::context::RegistryContext;
use crate::definition::{PluginDefinition, PluginReference, ResolvedPluginDefinition};
use crate::error::{BasePathKind, RegistryError, RegistryResult};
use crate::loader::{ModuleLoader, PluginModule};
use crate::paths::{self, MODULES_DIR};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Turn a reference into a definition, filing bare names under the
/// context's default category.
pub fn normalize_reference(
    reference: PluginReference,
    context: &RegistryContext,
) -> PluginDefinition {
    match reference {
        PluginReference::Name(name) => PluginDefinition::new(name, context.default_category()),
        PluginReference::Definition(definition) => definition,
    }
}

/// Build the ordered candidate paths for a plugin name.
pub fn candidate_paths(name: &str, tool_path: &Path, project_path: &Path) -> [PathBuf; 3] {
    [
        paths::resolve(tool_path, [MODULES_DIR, name]),
        paths::resolve(project_path, [MODULES_DIR, name]),
        paths::resolve(tool_path, ["..", name]),
    ]
}

/// Fill in missing base paths and check that both are absolute.
///
/// Inferred values are written back into `context`.
pub fn base_paths(context: &mut RegistryContext) -> RegistryResult<(PathBuf, PathBuf)> {
    base_paths_with(context, paths::infer_tool_path, paths::infer_project_path)
}

fn base_paths_with(
    context: &mut RegistryContext,
    infer_tool: impl FnOnce() -> PathBuf,
    infer_project: impl FnOnce() -> PathBuf,
) -> RegistryResult<(PathBuf, PathBuf)> {
    let tool_path = match context.tool_path() {
        Some(path) => path.to_path_buf(),
        None => {
            let inferred = infer_tool();
            debug!("Inferred tool path {:?}", inferred);
            context.tool_path = Some(inferred.clone());
            inferred
        }
    };

    let project_path = match context.project_path() {
        Some(path) => path.to_path_buf(),
        None => {
            let inferred = infer_project();
            debug!("Inferred project path {:?}", inferred);
            context.project_path = Some(inferred.clone());
            inferred
        }
    };

    if !tool_path.is_absolute() {
        return Err(RegistryError::InvalidBasePath {
            kind: BasePathKind::Tool,
            path: tool_path,
        });
    }
    if !project_path.is_absolute() {
        return Err(RegistryError::InvalidBasePath {
            kind: BasePathKind::Project,
            path: project_path,
        });
    }

    Ok((tool_path, project_path))
}

/// Resolve a plugin reference to a loaded definition.
///
/// `context` may gain inferred `tool_path` / `project_path` values.
pub fn resolve_definition(
    reference: impl Into<PluginReference>,
    context: &mut RegistryContext,
    loader: &dyn ModuleLoader,
) -> RegistryResult<ResolvedPluginDefinition> {
    let definition = normalize_reference(reference.into(), context);

    if definition.name.is_empty() {
        return Err(RegistryError::MissingName);
    }
    if definition.category.is_empty() {
        return Err(RegistryError::MissingCategory);
    }

    let (require_path, module) = match &definition.require_path {
        Some(explicit) => load_explicit(&definition.name, explicit, loader)?,
        None => {
            let (tool_path, project_path) = base_paths(context)?;
            let candidates = candidate_paths(&definition.name, &tool_path, &project_path);
            probe_candidates(&definition.name, candidates, loader)?
        }
    };

    if !require_path.is_absolute() {
        return Err(RegistryError::ResolvedPathNotAbsolute(require_path));
    }

    Ok(ResolvedPluginDefinition {
        name: definition.name,
        category: definition.category,
        require_path,
        extra: definition.extra,
        module: Arc::new(module),
    })
}

fn load_explicit(
    name: &str,
    path: &Path,
    loader: &dyn ModuleLoader,
) -> RegistryResult<(PathBuf, PluginModule)> {
    if !path.is_absolute() {
        return Err(RegistryError::RelativePathRejected(path.to_path_buf()));
    }

    match loader.load(path) {
        Ok(module) => Ok((path.to_path_buf(), module)),
        Err(source) => Err(RegistryError::ModuleLoadFailed {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn probe_candidates(
    name: &str,
    candidates: [PathBuf; 3],
    loader: &dyn ModuleLoader,
) -> RegistryResult<(PathBuf, PluginModule)> {
    let mut failed = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match loader.load(&candidate) {
            Ok(module) => {
                debug!("Plugin {} found at {:?}", name, candidate);
                return Ok((candidate, module));
            }
            Err(e) => {
                debug!("Plugin {} not loadable from {:?}: {}", name, candidate, e);
                failed.push(candidate);
            }
        }
    }

    Err(RegistryError::PluginNotFound {
        name: name.to_string(),
        candidates: failed,
    })
}
