//! Deployment domain types

use serde::{Deserialize, Serialize};

use super::site::slugify;

/// Identity of the hosted site a deployment targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteIdentity {
    /// Human-readable site name (usually the business name)
    pub name: String,
    /// Hosting-side site ID; `None` means a new site is created
    #[serde(default)]
    pub site_id: Option<String>,
}

impl SiteIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            site_id: None,
        }
    }

    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    /// Filesystem and subdomain safe form of the name
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Outcome of handing files to the hosting API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentResult {
    Success {
        url: String,
    },
    Failure {
        message: String,
        /// URL known before the failing call, kept for diagnostics
        partial_url: Option<String>,
    },
}

impl DeploymentResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            partial_url: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Success { url } => Some(url),
            Self::Failure { partial_url, .. } => partial_url.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_slug() {
        let identity = SiteIdentity::new("Main Street Dental").with_site_id("abc");
        assert_eq!(identity.slug(), "main-street-dental");
        assert_eq!(identity.site_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_result_url() {
        let ok = DeploymentResult::Success {
            url: "https://x.example".to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.url(), Some("https://x.example"));

        let failed = DeploymentResult::failure("quota exceeded");
        assert!(!failed.is_success());
        assert_eq!(failed.url(), None);
    }
}
