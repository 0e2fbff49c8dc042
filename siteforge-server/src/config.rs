//! Server configuration
//!
//! Loaded from environment variables with fallback to defaults.

use anyhow::{Context, Result};
use siteforge_builder::{BuildConfig, CommandSpec};
use std::path::PathBuf;
use std::time::Duration;

pub use siteforge_builder::config::DEFAULT_DEPLOY_TIMEOUT;

/// Default hosting API base URL
pub const DEFAULT_HOSTING_API_URL: &str = "https://api.netlify.com/api/v1";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Build pipeline settings (workspace root, commands, timeouts)
    pub build: BuildConfig,

    /// Maximum time a whole deployment may take
    pub deploy_timeout: Duration,

    /// Hosting API base URL
    pub hosting_api_url: String,

    /// Hosting API access token
    pub hosting_api_token: Option<String>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - SITEFORGE_BIND_ADDR (default: 0.0.0.0:8080)
    /// - SITEFORGE_WORKSPACE_ROOT (default: <tmp>/siteforge-builds)
    /// - SITEFORGE_INSTALL_COMMAND (default: npm install --no-audit --no-fund)
    /// - SITEFORGE_BUILD_COMMAND (default: npm run build)
    /// - SITEFORGE_INSTALL_TIMEOUT (seconds, default: 120)
    /// - SITEFORGE_BUILD_TIMEOUT (seconds, default: 180)
    /// - SITEFORGE_DEPLOY_TIMEOUT (seconds, default: 60)
    /// - SITEFORGE_MAX_BODY_BYTES (default: 25 MiB)
    /// - HOSTING_API_URL (default: https://api.netlify.com/api/v1)
    /// - HOSTING_API_TOKEN
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from any variable source
    ///
    /// Unset variables keep their defaults. A variable that is set but
    /// unusable is an error.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = var("SITEFORGE_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Some(root) = var("SITEFORGE_WORKSPACE_ROOT") {
            config.build.workspace_root = PathBuf::from(root);
        }

        if let Some(line) = var("SITEFORGE_INSTALL_COMMAND") {
            config.build.install_command = CommandSpec::parse(&line)
                .ok_or_else(|| anyhow::anyhow!("SITEFORGE_INSTALL_COMMAND is empty"))?;
        }

        if let Some(line) = var("SITEFORGE_BUILD_COMMAND") {
            config.build.build_command = CommandSpec::parse(&line)
                .ok_or_else(|| anyhow::anyhow!("SITEFORGE_BUILD_COMMAND is empty"))?;
        }

        if let Some(timeout) = parse_secs(&var, "SITEFORGE_INSTALL_TIMEOUT")? {
            config.build.install_timeout = timeout;
        }

        if let Some(timeout) = parse_secs(&var, "SITEFORGE_BUILD_TIMEOUT")? {
            config.build.build_timeout = timeout;
        }

        if let Some(timeout) = parse_secs(&var, "SITEFORGE_DEPLOY_TIMEOUT")? {
            config.deploy_timeout = timeout;
        }

        if let Some(bytes) = var("SITEFORGE_MAX_BODY_BYTES") {
            config.max_body_bytes = bytes.trim().parse::<usize>().with_context(|| {
                format!("SITEFORGE_MAX_BODY_BYTES must be a byte count, got {:?}", bytes)
            })?;
        }

        if let Some(url) = var("HOSTING_API_URL") {
            config.hosting_api_url = url;
        }

        config.hosting_api_token = var("HOSTING_API_TOKEN").filter(|token| !token.trim().is_empty());

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if !self.hosting_api_url.starts_with("http://")
            && !self.hosting_api_url.starts_with("https://")
        {
            anyhow::bail!("hosting_api_url must start with http:// or https://");
        }

        if self.deploy_timeout.is_zero() {
            anyhow::bail!("deploy_timeout must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        self.build.validate().map_err(anyhow::Error::msg)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            build: BuildConfig::default(),
            deploy_timeout: DEFAULT_DEPLOY_TIMEOUT,
            hosting_api_url: DEFAULT_HOSTING_API_URL.to_string(),
            hosting_api_token: None,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Reads a whole number of seconds from `name`
fn parse_secs(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<Duration>> {
    var(name)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("{} must be a whole number of seconds, got {:?}", name, value))
        })
        .transpose()
}
