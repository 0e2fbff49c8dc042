//! Site pipeline
//!
//! Runs one site build from generated sources to a hosted URL:
//!
//! `Idle -> WorkspaceAcquired -> SourcesMaterialized -> DependenciesInstalled
//!  -> Built -> Harvested -> Deployed`
//!
//! The first failing stage ends the run. Whatever happens after the
//! workspace is acquired, it is released before control returns. Nothing is
//! retried.

use siteforge_core::domain::deployment::{DeploymentResult, SiteIdentity};
use siteforge_core::domain::pipeline::{PipelineReport, PipelineStage};
use siteforge_core::domain::site::{ArtifactSet, SourceFileSet};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::BuildConfig;
use crate::deploy::Deployer;
use crate::error::{PipelineError, WorkspaceError};
use crate::executor::BuildExecutor;
use crate::harvest::harvest;
use crate::materialize::materialize;
use crate::workspace::{Workspace, WorkspaceManager};

/// Build-and-deploy pipeline
pub struct SitePipeline {
    workspaces: WorkspaceManager,
    executor: BuildExecutor,
    deployer: Arc<dyn Deployer>,
}

impl SitePipeline {
    pub fn new(config: &BuildConfig, deployer: Arc<dyn Deployer>) -> Self {
        Self {
            workspaces: WorkspaceManager::new(&config.workspace_root, &config.output_subdir),
            executor: BuildExecutor::new(config),
            deployer,
        }
    }

    /// Builds `files` and returns the harvested output without deploying
    pub async fn build(
        &self,
        site_name: &str,
        files: &SourceFileSet,
    ) -> Result<ArtifactSet, PipelineError> {
        let invocation_id = Uuid::new_v4();
        info!("Build {} started for '{}'", invocation_id, site_name);

        let workspace = self.acquire(site_name, invocation_id).await?;
        let mut reached = PipelineStage::WorkspaceAcquired;
        let outcome = self.build_in(&workspace, files, &mut reached).await;
        release(workspace, invocation_id).await;

        match &outcome {
            Ok(artifacts) => info!(
                "Build {} finished with {} file(s)",
                invocation_id,
                artifacts.len()
            ),
            Err(e) => log_failure(invocation_id, reached, e),
        }

        outcome
    }

    /// Builds `files` and deploys the result as `identity`
    pub async fn run(&self, identity: &SiteIdentity, files: &SourceFileSet) -> PipelineReport {
        let invocation_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        info!(
            "Pipeline {} started for '{}' ({} source file(s))",
            invocation_id,
            identity.name,
            files.len()
        );

        let (reached, result) = match self.acquire(&identity.name, invocation_id).await {
            Ok(workspace) => {
                let mut reached = PipelineStage::WorkspaceAcquired;
                let result = match self.build_in(&workspace, files, &mut reached).await {
                    Ok(artifacts) => {
                        let result = self.deployer.deploy(identity, &artifacts).await;
                        if result.is_success() {
                            reached = PipelineStage::Deployed;
                        }
                        result
                    }
                    Err(e) => {
                        log_failure(invocation_id, reached, &e);
                        DeploymentResult::failure(e.user_message())
                    }
                };
                release(workspace, invocation_id).await;
                (reached, result)
            }
            Err(e) => {
                let e = PipelineError::from(e);
                log_failure(invocation_id, PipelineStage::Idle, &e);
                (PipelineStage::Idle, DeploymentResult::failure(e.user_message()))
            }
        };

        match &result {
            DeploymentResult::Success { url } => {
                info!("Pipeline {} deployed to {}", invocation_id, url)
            }
            DeploymentResult::Failure { message, .. } => {
                warn!(
                    "Pipeline {} failed after stage {}: {}",
                    invocation_id, reached, message
                )
            }
        }

        PipelineReport {
            invocation_id,
            reached,
            result,
            started_at,
            finished_at: chrono::Utc::now(),
        }
    }

    async fn acquire(
        &self,
        site_name: &str,
        invocation_id: Uuid,
    ) -> Result<Workspace, WorkspaceError> {
        let workspaces = self.workspaces.clone();
        let site_name = site_name.to_string();
        blocking(move || workspaces.acquire(&site_name, invocation_id)).await
    }

    /// Materialize, install, build and harvest inside `workspace`
    async fn build_in(
        &self,
        workspace: &Workspace,
        files: &SourceFileSet,
        reached: &mut PipelineStage,
    ) -> Result<ArtifactSet, PipelineError> {
        let root = workspace.root().to_path_buf();
        let sources = files.clone();
        blocking(move || materialize(&root, &sources)).await?;
        *reached = PipelineStage::SourcesMaterialized;

        self.executor.run_install(workspace.root()).await?;
        *reached = PipelineStage::DependenciesInstalled;

        let output_dir = self.executor.run_build(workspace.root()).await?;
        *reached = PipelineStage::Built;

        let artifacts = blocking(move || harvest(&output_dir)).await?;
        *reached = PipelineStage::Harvested;

        Ok(artifacts)
    }
}

async fn release(workspace: Workspace, invocation_id: Uuid) {
    if let Err(e) = blocking(move || workspace.release()).await {
        warn!("Pipeline {}: {}", invocation_id, e);
    }
}

/// Runs filesystem work on the blocking pool
async fn blocking<T, F>(work: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

fn log_failure(invocation_id: Uuid, reached: PipelineStage, err: &PipelineError) {
    error!(
        "Pipeline {} failed after stage {}: {}",
        invocation_id, reached, err
    );

    if let PipelineError::Build(build_err) = err {
        if let Some(output) = build_err.output() {
            error!("Pipeline {} {} output:\n{}", invocation_id, build_err.step(), output);
        }
    }
}
