//! SiteForge CLI
//!
//! Command-line interface for building and deploying sites through a
//! SiteForge server.

mod api;
mod commands;
mod config;
mod source;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "siteforge")]
#[command(about = "SiteForge site build and deploy CLI", long_about = None)]
struct Cli {
    /// SiteForge server URL
    #[arg(
        long,
        env = "SITEFORGE_SERVER_URL",
        default_value = "http://localhost:8080"
    )]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
