//! Build pipeline domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::deployment::DeploymentResult;

/// Stages of a site build, in execution order
///
/// A run moves forward one stage at a time and stops at the first failure.
/// `Idle` is the state before the workspace exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    WorkspaceAcquired,
    SourcesMaterialized,
    DependenciesInstalled,
    Built,
    Harvested,
    Deployed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::WorkspaceAcquired => "workspace_acquired",
            PipelineStage::SourcesMaterialized => "sources_materialized",
            PipelineStage::DependenciesInstalled => "dependencies_installed",
            PipelineStage::Built => "built",
            PipelineStage::Harvested => "harvested",
            PipelineStage::Deployed => "deployed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub invocation_id: Uuid,
    /// Last stage that completed
    pub reached: PipelineStage,
    pub result: DeploymentResult,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.reached == PipelineStage::Deployed && self.result.is_success()
    }
}
