//! Site and deploy endpoints

use serde::{Deserialize, Serialize};
use siteforge_core::domain::site::ArtifactSet;
use tracing::debug;

use crate::HostingClient;
use crate::error::Result;

/// Request body for creating a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSite {
    pub name: String,
}

/// A site as returned by the hosting API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedSite {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Request body for a deploy: the complete file map of the site
#[derive(Debug, Clone, Serialize)]
pub struct CreateDeploy<'a> {
    pub files: &'a ArtifactSet,
}

/// A deploy as returned by the hosting API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedDeploy {
    pub id: String,
    pub site_id: String,
    pub state: String,
    /// Primary URL of the site
    pub url: String,
    /// Permalink of this specific deploy
    #[serde(default)]
    pub deploy_url: Option<String>,
}

impl HostedDeploy {
    /// URL visitors should be sent to
    pub fn public_url(&self) -> &str {
        &self.url
    }

    /// Whether the hosting API rejected the deploy after accepting the upload
    pub fn is_error(&self) -> bool {
        self.state.eq_ignore_ascii_case("error")
    }
}

impl HostingClient {
    // =============================================================================
    // Sites
    // =============================================================================

    /// Create a new site
    ///
    /// # Arguments
    /// * `name` - Site name; hosting APIs use it as the subdomain
    pub async fn create_site(&self, name: &str) -> Result<HostedSite> {
        let url = format!("{}/sites", self.base_url);
        debug!("Creating hosted site '{}'", name);

        let response = self
            .authorize(self.client.post(&url))
            .json(&CreateSite {
                name: name.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get an existing site by ID
    pub async fn get_site(&self, site_id: &str) -> Result<HostedSite> {
        let url = format!("{}/sites/{}", self.base_url, site_id);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Deploys
    // =============================================================================

    /// Upload a complete file map as a new deploy of `site_id`
    ///
    /// # Arguments
    /// * `site_id` - Target site
    /// * `files` - Relative path -> text content
    pub async fn create_deploy(&self, site_id: &str, files: &ArtifactSet) -> Result<HostedDeploy> {
        let url = format!("{}/sites/{}/deploys", self.base_url, site_id);
        debug!("Uploading {} file(s) to site {}", files.len(), site_id);

        let response = self
            .authorize(self.client.post(&url))
            .json(&CreateDeploy { files })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
