//! API client module
//!
//! HTTP client for communicating with the SiteForge server.

use anyhow::{Context, Result};
use reqwest::Client;
use siteforge_core::dto::site::{
    BuildSiteRequest, BuildSiteResponse, DeploySiteRequest, DeploySiteResponse,
};

/// HTTP client for the SiteForge server API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the SiteForge server
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Build and deploy a site
    ///
    /// Failed deployments still carry a `DeploySiteResponse` body, so any
    /// response that parses as one is returned regardless of status.
    pub async fn deploy_site(&self, req: &DeploySiteRequest) -> Result<DeploySiteResponse> {
        let url = format!("{}/api/site/deploy", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send deploy site request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read deploy site response")?;

        match serde_json::from_str::<DeploySiteResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => {
                anyhow::bail!("Request failed with status {}: {}", status, body)
            }
            Err(e) => Err(e).context("Failed to parse response JSON"),
        }
    }

    /// Build a site without deploying it
    ///
    /// # Returns
    /// The harvested build output
    pub async fn build_site(&self, req: &BuildSiteRequest) -> Result<BuildSiteResponse> {
        let url = format!("{}/api/site/build", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send build site request")?;

        self.handle_response(response).await
    }

    /// Handle API response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<DeploySiteResponse>(&error_text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(error_text);
            anyhow::bail!("Request failed with status {}: {}", status, message);
        }

        response
            .json()
            .await
            .context("Failed to parse response JSON")
    }
}
