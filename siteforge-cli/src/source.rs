//! Local source directory loading
//!
//! Reads a site's source tree into a `SourceFileSet` for submission.

use anyhow::{Context, Result};
use siteforge_builder::harvest::is_binary_path;
use siteforge_core::domain::site::SourceFileSet;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Directories never submitted (dependencies, VCS metadata, build output)
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", ".next", "out"];

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Reads every text file under `dir`, keyed by `/`-separated relative path
///
/// Binary assets are skipped. Non-UTF-8 files are reported as errors since
/// the server only accepts text.
pub fn read_source_dir(dir: &Path) -> Result<SourceFileSet> {
    if !dir.is_dir() {
        anyhow::bail!("Source directory {} does not exist", dir.display());
    }

    let mut files = SourceFileSet::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = entry.context("Failed to walk source directory")?;
        if !entry.file_type().is_file() || is_binary_path(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .context("Walked outside of the source directory")?;
        let key = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {:?} as UTF-8 text", entry.path()))?;
        files.insert(key, content);
    }

    if files.is_empty() {
        anyhow::bail!("No source files found in {}", dir.display());
    }

    Ok(files)
}

/// Writes harvested files under `dir`, creating parent directories
pub fn write_files(dir: &Path, files: &SourceFileSet) -> Result<()> {
    for (path, content) in files {
        let target = siteforge_builder::materialize::resolve_source_path(dir, path)
            .with_context(|| format!("Refusing to write unsafe path {:?}", path))?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("Failed to write {:?}", target))?;
    }
    Ok(())
}
