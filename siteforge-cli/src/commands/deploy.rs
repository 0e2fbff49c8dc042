//! Deploy command handler

use anyhow::Result;
use colored::*;
use siteforge_core::domain::business::BusinessProfile;
use siteforge_core::dto::site::{DeploySiteRequest, DeploySiteResponse};
use std::path::Path;

use crate::api::ApiClient;
use crate::config::Config;
use crate::source::read_source_dir;

/// Submit a local source directory for build and deployment
pub async fn handle_deploy_command(
    config: &Config,
    name: String,
    source: &Path,
    site_id: Option<String>,
) -> Result<()> {
    let files = read_source_dir(source)?;
    println!(
        "{} {} file(s) from {}",
        "Submitting".cyan(),
        files.len(),
        source.display()
    );

    let client = ApiClient::new(&config.server_url);
    let response = client
        .deploy_site(&DeploySiteRequest {
            business: BusinessProfile::named(name),
            site_id,
            files: Some(files),
        })
        .await?;

    print_deploy_response(&response);

    if !response.success {
        anyhow::bail!("Deployment failed");
    }

    Ok(())
}

fn print_deploy_response(response: &DeploySiteResponse) {
    if response.success {
        println!("{}", "✓ Site deployed!".green().bold());
        if let Some(url) = &response.url {
            println!("  {}: {}", "URL".bold(), url.cyan());
        }
        return;
    }

    println!("{}", "✗ Deployment failed".red().bold());
    if let Some(error) = &response.error {
        println!("  {}: {}", "Error".bold(), error);
    }
    if let Some(stage) = &response.reached_stage {
        println!("  {}: {}", "Last completed stage".bold(), stage);
    }
    if let Some(url) = &response.partial_url {
        println!(
            "  {}: {}",
            "Site created at".bold(),
            url.yellow()
        );
    }
}
