//! Error types for the build pipeline
//!
//! One error type per stage. `PipelineError` wraps them so the orchestrator
//! can tell which stage gave up.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Workspace directory could not be prepared or removed
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Failed to create workspace root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to clear stale workspace {path}: {source}")]
    ClearStale {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove workspace {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A source file could not be written into the workspace
#[derive(Debug, Error)]
pub enum MaterializationError {
    /// Empty, absolute, or escaping the workspace
    #[error("Invalid source path '{0}'")]
    InvalidPath(String),

    #[error("Failed to write source file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// External build steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Install,
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Install => f.write_str("install"),
            BuildStep::Build => f.write_str("build"),
        }
    }
}

/// Install or build command did not succeed
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to start {step} command '{command}': {source}")]
    Spawn {
        step: BuildStep,
        command: String,
        source: std::io::Error,
    },

    #[error("{step} command exited with {}", describe_exit(.exit_code))]
    Failed {
        step: BuildStep,
        exit_code: Option<i32>,
        /// Captured stdout and stderr (tail)
        output: String,
    },

    #[error("{step} command timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { step: BuildStep, timeout: Duration },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

impl BuildError {
    pub fn step(&self) -> BuildStep {
        match self {
            BuildError::Spawn { step, .. }
            | BuildError::Failed { step, .. }
            | BuildError::TimedOut { step, .. } => *step,
        }
    }

    /// Captured process output, when there is any
    pub fn output(&self) -> Option<&str> {
        match self {
            BuildError::Failed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}

/// Build output could not be collected
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Build output directory {0} does not exist")]
    MissingOutput(PathBuf),

    #[error("Failed to walk build output: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read build output file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Any fatal pipeline failure
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Harvest(#[from] HarvestError),
}

impl PipelineError {
    /// Message safe to show to end users
    ///
    /// Never contains workspace paths or process output.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Workspace(_) => "Could not prepare a build workspace",
            PipelineError::Materialization(MaterializationError::InvalidPath(_)) => {
                "Generated site contains an invalid file path"
            }
            PipelineError::Materialization(_) => "Could not write the generated site files",
            PipelineError::Build(err) => match err.step() {
                BuildStep::Install => "Installing site dependencies failed",
                BuildStep::Build => "Building the site failed",
            },
            PipelineError::Harvest(_) => "Could not collect the built site files",
        }
    }
}
