//! Source materialization
//!
//! Writes a generated source file set into a workspace.

use siteforge_core::domain::site::SourceFileSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::MaterializationError;

/// Resolves a relative source path under `root`
///
/// Only plain path segments are accepted; absolute paths, `..` and drive
/// prefixes are rejected.
pub fn resolve_source_path(root: &Path, relative: &str) -> Result<PathBuf, MaterializationError> {
    let invalid = || MaterializationError::InvalidPath(relative.to_string());

    if relative.trim().is_empty() {
        return Err(invalid());
    }

    let mut resolved = root.to_path_buf();
    let mut segments = 0;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }

    if segments == 0 {
        return Err(invalid());
    }

    Ok(resolved)
}

/// Writes every file of `files` under `root`
///
/// All paths are checked before the first write, so an invalid path leaves
/// the workspace untouched. Returns the number of files written.
pub fn materialize(root: &Path, files: &SourceFileSet) -> Result<usize, MaterializationError> {
    let targets = files
        .iter()
        .map(|(relative, content)| {
            resolve_source_path(root, relative).map(|path| (relative, path, content))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (relative, path, content) in &targets {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| MaterializationError::Write {
                path: relative.to_string(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| MaterializationError::Write {
            path: relative.to_string(),
            source,
        })?;
    }

    debug!("Materialized {} source file(s)", targets.len());
    Ok(targets.len())
}
