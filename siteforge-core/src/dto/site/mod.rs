//! Site build/deploy DTOs

use serde::{Deserialize, Serialize};

use crate::domain::business::BusinessProfile;
use crate::domain::deployment::DeploymentResult;
use crate::domain::pipeline::PipelineStage;
use crate::domain::site::{ArtifactSet, SourceFileSet};

/// Request to build and deploy a site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySiteRequest {
    pub business: BusinessProfile,
    /// Existing hosting site to update instead of creating a new one
    #[serde(default)]
    pub site_id: Option<String>,
    /// Pre-generated sources; when absent the server generates them
    #[serde(default)]
    pub files: Option<SourceFileSet>,
}

/// Response of a deploy request
///
/// Serializes as `{ success: true, url }` or
/// `{ success: false, error, partialUrl? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySiteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_url: Option<String>,
    /// Last stage completed before the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reached_stage: Option<PipelineStage>,
}

impl DeploySiteResponse {
    pub fn success(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
            partial_url: None,
            reached_stage: None,
        }
    }

    pub fn failure(error: impl Into<String>, reached_stage: Option<PipelineStage>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
            partial_url: None,
            reached_stage,
        }
    }

    pub fn with_partial_url(mut self, partial_url: Option<String>) -> Self {
        self.partial_url = partial_url;
        self
    }
}

impl From<DeploymentResult> for DeploySiteResponse {
    fn from(result: DeploymentResult) -> Self {
        match result {
            DeploymentResult::Success { url } => Self::success(url),
            DeploymentResult::Failure {
                message,
                partial_url,
            } => Self::failure(message, None).with_partial_url(partial_url),
        }
    }
}

/// Request to build a site without deploying it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSiteRequest {
    pub business: BusinessProfile,
    #[serde(default)]
    pub files: Option<SourceFileSet>,
}

/// Harvested output of a build-only request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSiteResponse {
    pub success: bool,
    pub files: ArtifactSet,
}
