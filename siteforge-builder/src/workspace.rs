//! Workspace management
//!
//! Each pipeline invocation builds inside its own directory:
//! `<workspace_root>/<site-slug>-<invocation-id>`. The per-invocation suffix
//! keeps concurrent builds of the same site apart.
//!
//! `Workspace` is a guard. `release()` removes the directory and reports
//! errors; if the guard is dropped without being released (early return,
//! panic) the directory is removed on drop.

use siteforge_core::domain::site::slugify;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::WorkspaceError;

/// Creates per-invocation workspaces under a common root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
    output_subdir: String,
}

impl WorkspaceManager {
    /// # Arguments
    /// * `root` - Base directory for all workspaces
    /// * `output_subdir` - Build output location relative to each workspace
    pub fn new(root: impl Into<PathBuf>, output_subdir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_subdir: output_subdir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name used for a site and invocation
    pub fn workspace_name(site_name: &str, invocation_id: Uuid) -> String {
        format!("{}-{}", slugify(site_name), invocation_id.simple())
    }

    /// Creates a fresh, empty workspace
    ///
    /// Leftovers at the target path from an earlier run are removed first.
    pub fn acquire(&self, site_name: &str, invocation_id: Uuid) -> Result<Workspace, WorkspaceError> {
        std::fs::create_dir_all(&self.root).map_err(|source| WorkspaceError::CreateRoot {
            path: self.root.clone(),
            source,
        })?;

        let path = self.root.join(Self::workspace_name(site_name, invocation_id));

        if path.exists() {
            warn!("Removing stale workspace {}", path.display());
            std::fs::remove_dir_all(&path).map_err(|source| WorkspaceError::ClearStale {
                path: path.clone(),
                source,
            })?;
        }

        std::fs::create_dir_all(&path).map_err(|source| WorkspaceError::Create {
            path: path.clone(),
            source,
        })?;

        debug!("Workspace created at {}", path.display());

        let output_dir = path.join(&self.output_subdir);
        Ok(Workspace {
            root: path,
            output_dir,
            released: false,
        })
    }
}

/// A workspace directory owned by one pipeline invocation
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    output_dir: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the build is expected to write its output
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Removes the workspace directory
    pub fn release(mut self) -> Result<(), WorkspaceError> {
        self.released = true;
        remove_if_present(&self.root).map_err(|source| WorkspaceError::Remove {
            path: self.root.clone(),
            source,
        })?;

        debug!("Workspace {} released", self.root.display());
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if let Err(e) = remove_if_present(&self.root) {
            warn!(
                "Failed to remove workspace {} on drop: {}",
                self.root.display(),
                e
            );
        }
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
