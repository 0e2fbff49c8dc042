//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod deploy;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a site from a source directory and deploy it
    Deploy {
        /// Business name used for the hosted site
        #[arg(short, long)]
        name: String,

        /// Directory holding the site sources
        #[arg(short, long)]
        source: PathBuf,

        /// Existing hosting site to deploy to
        #[arg(long)]
        site_id: Option<String>,
    },
    /// Build a site from a source directory without deploying it
    Build {
        /// Business name for the site
        #[arg(short, long)]
        name: String,

        /// Directory holding the site sources
        #[arg(short, long)]
        source: PathBuf,

        /// Where to write the built files (lists them when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Deploy {
            name,
            source,
            site_id,
        } => deploy::handle_deploy_command(config, name, &source, site_id).await,
        Commands::Build {
            name,
            source,
            output,
        } => build::handle_build_command(config, name, &source, output.as_deref()).await,
    }
}
