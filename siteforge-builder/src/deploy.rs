//! Deployment submission
//!
//! Hands harvested files to the static-hosting API. Deployers never fail
//! with an error: every problem becomes a `DeploymentResult::Failure` so
//! the caller decides how to answer its own client.

use async_trait::async_trait;
use siteforge_client::{ClientError, HostingClient};
use siteforge_core::domain::deployment::{DeploymentResult, SiteIdentity};
use siteforge_core::domain::site::ArtifactSet;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::DEFAULT_DEPLOY_TIMEOUT;

const TIMEOUT_MESSAGE: &str = "Hosting provider did not respond in time";

/// Submits a built site for hosting
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Deploys `files` as the complete content of the site
    async fn deploy(&self, identity: &SiteIdentity, files: &ArtifactSet) -> DeploymentResult;
}

/// Deployer backed by the hosting API
pub struct HostingDeployer {
    client: HostingClient,
    timeout: Duration,
}

impl HostingDeployer {
    pub fn new(client: HostingClient) -> Self {
        Self {
            client,
            timeout: DEFAULT_DEPLOY_TIMEOUT,
        }
    }

    /// Bounds the whole deployment, however many API calls it takes
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn submit(&self, identity: &SiteIdentity, files: &ArtifactSet) -> DeploymentResult {
        let (site_id, site_url) = match &identity.site_id {
            Some(site_id) => (site_id.clone(), None),
            None => match self.client.create_site(&identity.slug()).await {
                Ok(site) => {
                    info!("Created hosted site {} ({})", site.name, site.id);
                    (site.id, Some(site.url))
                }
                Err(e) => {
                    error!("Failed to create hosted site for '{}': {}", identity.name, e);
                    return DeploymentResult::failure(describe(&e));
                }
            },
        };

        match self.client.create_deploy(&site_id, files).await {
            Ok(deploy) if deploy.is_error() => {
                error!("Deploy {} for site {} ended in error state", deploy.id, site_id);
                let partial_url = match deploy.deploy_url.or(site_url) {
                    Some(url) => Some(url),
                    None => self.existing_site_url(&site_id).await,
                };
                DeploymentResult::Failure {
                    message: format!("Deploy {} was rejected by the hosting provider", deploy.id),
                    partial_url,
                }
            }
            Ok(deploy) => {
                info!("Deploy {} live at {}", deploy.id, deploy.public_url());
                DeploymentResult::Success { url: deploy.url }
            }
            Err(e) => {
                error!("Failed to deploy site {}: {}", site_id, e);
                let partial_url = match site_url {
                    Some(url) => Some(url),
                    None if !e.is_timeout() => self.existing_site_url(&site_id).await,
                    None => None,
                };
                DeploymentResult::Failure {
                    message: describe(&e),
                    partial_url,
                }
            }
        }
    }

    /// URL of a site that was deployed to before, for failure diagnostics
    async fn existing_site_url(&self, site_id: &str) -> Option<String> {
        match self.client.get_site(site_id).await {
            Ok(site) => Some(site.url),
            Err(e) => {
                debug!("Could not look up site {}: {}", site_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl Deployer for HostingDeployer {
    async fn deploy(&self, identity: &SiteIdentity, files: &ArtifactSet) -> DeploymentResult {
        match tokio::time::timeout(self.timeout, self.submit(identity, files)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Deploying '{}' exceeded {}s",
                    identity.name,
                    self.timeout.as_secs_f64()
                );
                DeploymentResult::failure(TIMEOUT_MESSAGE)
            }
        }
    }
}

fn describe(err: &ClientError) -> String {
    match err {
        ClientError::ApiError { message, .. } if err.is_unauthorized() => {
            format!("Hosting provider rejected the credentials: {}", message)
        }
        ClientError::ApiError { message, .. } => format!("Hosting provider error: {}", message),
        _ if err.is_timeout() => TIMEOUT_MESSAGE.to_string(),
        ClientError::RequestFailed(_) => "Could not reach the hosting provider".to_string(),
        ClientError::ParseError(_) => "Unexpected response from the hosting provider".to_string(),
        ClientError::InvalidConfig(msg) => format!("Hosting client misconfigured: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn files() -> ArtifactSet {
        let mut files = ArtifactSet::new();
        files.insert("index.html".to_string(), "<html></html>".to_string());
        files
    }

    fn create_site_route() -> axum::routing::MethodRouter {
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "id": "site-9",
                "name": body["name"],
                "url": "https://acme.hosted.test",
            }))
        })
    }

    #[tokio::test]
    async fn test_creates_site_then_deploys() {
        let router = Router::new()
            .route("/sites", create_site_route())
            .route(
                "/sites/{id}/deploys",
                post(|| async {
                    Json(json!({
                        "id": "d1", "site_id": "site-9", "state": "ready",
                        "url": "https://acme.hosted.test"
                    }))
                }),
            );
        let deployer = HostingDeployer::new(HostingClient::new(spawn_stub(router).await));

        let result = deployer.deploy(&SiteIdentity::new("Acme"), &files()).await;
        assert_eq!(
            result,
            DeploymentResult::Success {
                url: "https://acme.hosted.test".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_existing_site_skips_creation() {
        // No /sites route: creating a site would fail with 404
        let router = Router::new().route(
            "/sites/{id}/deploys",
            post(|| async {
                Json(json!({
                    "id": "d2", "site_id": "known", "state": "ready",
                    "url": "https://known.hosted.test"
                }))
            }),
        );
        let deployer = HostingDeployer::new(HostingClient::new(spawn_stub(router).await));

        let identity = SiteIdentity::new("Acme").with_site_id("known");
        let result = deployer.deploy(&identity, &files()).await;
        assert_eq!(result.url(), Some("https://known.hosted.test"));
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_deploy_failure_keeps_partial_url() {
        let router = Router::new().route("/sites", create_site_route()).route(
            "/sites/{id}/deploys",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "code": 422, "message": "Too many files" })),
                )
            }),
        );
        let deployer = HostingDeployer::new(HostingClient::new(spawn_stub(router).await));

        let result = deployer.deploy(&SiteIdentity::new("Acme"), &files()).await;
        assert_eq!(
            result,
            DeploymentResult::Failure {
                message: "Hosting provider error: Too many files".to_string(),
                partial_url: Some("https://acme.hosted.test".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let router = Router::new().route(
            "/sites",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let client =
            HostingClient::with_timeout(spawn_stub(router).await, Duration::from_millis(100))
                .unwrap();
        let deployer = HostingDeployer::new(client);

        let result = deployer.deploy(&SiteIdentity::new("Slow"), &files()).await;
        assert_eq!(
            result,
            DeploymentResult::failure("Hosting provider did not respond in time")
        );
    }

    #[tokio::test]
    async fn test_existing_site_failure_reports_site_url() {
        let router = Router::new()
            .route(
                "/sites/{id}",
                get(|| async {
                    Json(json!({
                        "id": "known", "name": "acme",
                        "url": "https://known.hosted.test"
                    }))
                }),
            )
            .route(
                "/sites/{id}/deploys",
                post(|| async {
                    (
                        StatusCode::PAYMENT_REQUIRED,
                        Json(json!({ "message": "Bandwidth quota exceeded" })),
                    )
                }),
            );
        let deployer = HostingDeployer::new(HostingClient::new(spawn_stub(router).await));

        let identity = SiteIdentity::new("Acme").with_site_id("known");
        let result = deployer.deploy(&identity, &files()).await;
        assert_eq!(
            result,
            DeploymentResult::Failure {
                message: "Hosting provider error: Bandwidth quota exceeded".to_string(),
                partial_url: Some("https://known.hosted.test".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_bounds_whole_deployment() {
        let router = Router::new()
            .route(
                "/sites",
                post(|Json(body): Json<Value>| async move {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    Json(json!({ "id": "site-9", "name": body["name"], "url": "https://a.test" }))
                }),
            )
            .route(
                "/sites/{id}/deploys",
                post(|| async {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    Json(json!({
                        "id": "d1", "site_id": "site-9", "state": "ready",
                        "url": "https://a.test"
                    }))
                }),
            );
        let deployer = HostingDeployer::new(HostingClient::new(spawn_stub(router).await))
            .with_timeout(Duration::from_millis(450));

        let started = std::time::Instant::now();
        let result = deployer.deploy(&SiteIdentity::new("Acme"), &files()).await;

        assert_eq!(
            result,
            DeploymentResult::failure("Hosting provider did not respond in time")
        );
        assert!(started.elapsed() < Duration::from_millis(750));
    }
}
