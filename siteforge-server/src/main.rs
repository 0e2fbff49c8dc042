//! SiteForge Server
//!
//! HTTP front for the site build-and-deploy pipeline.
//!
//! - Configuration: environment variables with defaults; invalid values stop startup
//! - Generator: scaffolds sources when a request carries none
//! - Pipeline: builds in an isolated workspace and deploys to the hosting API

use anyhow::{Context, Result};
use siteforge_builder::{HostingDeployer, SitePipeline};
use siteforge_client::HostingClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod generator;
pub mod service;
pub mod state;

use crate::config::Config;
use crate::generator::StaticExportGenerator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "siteforge_server=debug,siteforge_builder=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SiteForge server...");

    let config = load_config()?;
    info!(
        "Loaded configuration: workspace_root={}, hosting_api_url={}",
        config.build.workspace_root.display(),
        config.hosting_api_url
    );

    if config.hosting_api_token.is_none() {
        tracing::warn!("HOSTING_API_TOKEN is not set; deploys will be unauthenticated");
    }

    let mut client = HostingClient::with_timeout(&config.hosting_api_url, config.deploy_timeout)
        .context("Failed to create hosting client")?;
    if let Some(token) = &config.hosting_api_token {
        client = client.with_token(token);
    }

    let deployer = HostingDeployer::new(client).with_timeout(config.deploy_timeout);
    let pipeline = SitePipeline::new(&config.build, Arc::new(deployer));
    let state = AppState::new(pipeline, StaticExportGenerator::new());

    // Build router with all API endpoints
    let app = api::create_router(state, config.max_body_bytes);

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

/// Loads and validates configuration from environment variables
fn load_config() -> Result<Config> {
    load_config_from(|name| std::env::var(name).ok())
}

fn load_config_from(var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let config = Config::from_lookup(var).context("Invalid configuration in environment")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_variable_fails_startup() {
        let vars = [
            ("HOSTING_API_TOKEN", "secret-token"),
            ("SITEFORGE_WORKSPACE_ROOT", "/srv/siteforge"),
            ("SITEFORGE_BUILD_COMMAND", "   "),
        ];
        let result = load_config_from(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        });

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("SITEFORGE_BUILD_COMMAND is empty"));
    }

    #[test]
    fn test_valid_variables_are_kept() {
        let config = load_config_from(|name| match name {
            "HOSTING_API_TOKEN" => Some("secret-token".to_string()),
            "SITEFORGE_WORKSPACE_ROOT" => Some("/srv/siteforge".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.hosting_api_token.as_deref(), Some("secret-token"));
        assert_eq!(
            config.build.workspace_root,
            std::path::PathBuf::from("/srv/siteforge")
        );
    }
}
