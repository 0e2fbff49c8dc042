//! SiteForge Hosting Client
//!
//! A small, typed HTTP client for the static-hosting deployment API.
//!
//! The API follows the Netlify-style resource layout: sites are created by
//! name, and each deploy uploads the full file map for one site.
//!
//! # Example
//!
//! ```no_run
//! use siteforge_client::HostingClient;
//! use std::collections::BTreeMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), siteforge_client::ClientError> {
//!     let client = HostingClient::new("https://api.netlify.com/api/v1").with_token("secret");
//!
//!     let site = client.create_site("joes-pizza").await?;
//!     let mut files = BTreeMap::new();
//!     files.insert("index.html".to_string(), "<html></html>".to_string());
//!
//!     let deploy = client.create_deploy(&site.id, &files).await?;
//!     println!("Deployed to {}", deploy.public_url());
//!     Ok(())
//! }
//! ```

pub mod error;
mod sites;

pub use error::{ClientError, Result};
pub use sites::{CreateDeploy, CreateSite, HostedDeploy, HostedSite};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the static-hosting API
#[derive(Debug, Clone)]
pub struct HostingClient {
    /// Base URL of the API (e.g., "https://api.netlify.com/api/v1")
    base_url: String,
    /// Personal access token sent as a bearer token
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl HostingClient {
    /// Create a new hosting client with default HTTP settings
    ///
    /// # Example
    /// ```
    /// use siteforge_client::HostingClient;
    ///
    /// let client = HostingClient::new("https://api.netlify.com/api/v1/");
    /// assert_eq!(client.base_url(), "https://api.netlify.com/api/v1");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new hosting client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Create a hosting client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self::with_client(base_url, client))
    }

    /// Attach an access token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Apply authentication to a request
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
