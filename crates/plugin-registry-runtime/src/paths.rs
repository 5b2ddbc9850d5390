//! Path helpers used when building candidate paths.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory that holds installed plugin dependencies.
pub const MODULES_DIR: &str = "node_modules";

/// Lexically normalize a path: drop `.` components and fold `..` into its
/// parent. The filesystem is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match normalized.components().next_back() {
                    Some(Component::Normal(_)) => normalized.pop(),
                    // `..` above the root stays at the root
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }

    normalized
}

/// Join `segments` onto `base` and normalize the result.
pub fn resolve<I, S>(base: &Path, segments: I) -> PathBuf
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    normalize(&path)
}

/// The tool path used when none is configured: the directory of the running
/// executable, or two levels above this crate when that is unavailable.
pub fn infer_tool_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(fallback_tool_path)
}

/// Ancestor directory used when the executable location is unknown.
pub fn fallback_tool_path() -> PathBuf {
    resolve(Path::new(env!("CARGO_MANIFEST_DIR")), ["..", ".."])
}

/// The project path used when none is configured: the working directory.
pub fn infer_project_path() -> PathBuf {
    project_path_from(std::env::current_dir())
}

/// Project path for a working-directory lookup; `.` when it failed.
pub fn project_path_from(cwd: io::Result<PathBuf>) -> PathBuf {
    cwd.unwrap_or_else(|_| PathBuf::from("."))
}
