//! Build command handler

use anyhow::Result;
use colored::*;
use siteforge_core::domain::business::BusinessProfile;
use siteforge_core::dto::site::BuildSiteRequest;
use std::path::Path;

use crate::api::ApiClient;
use crate::config::Config;
use crate::source::{read_source_dir, write_files};

/// Build a local source directory remotely and fetch the output
pub async fn handle_build_command(
    config: &Config,
    name: String,
    source: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let files = read_source_dir(source)?;
    println!(
        "{} {} file(s) from {}",
        "Building".cyan(),
        files.len(),
        source.display()
    );

    let client = ApiClient::new(&config.server_url);
    let response = client
        .build_site(&BuildSiteRequest {
            business: BusinessProfile::named(name),
            files: Some(files),
        })
        .await?;

    println!(
        "{}",
        format!("✓ Built {} file(s)", response.files.len())
            .green()
            .bold()
    );

    match output {
        Some(dir) => {
            write_files(dir, &response.files)?;
            println!("  {} {}", "Written to".green(), dir.display().to_string().cyan());
        }
        None => {
            for (path, content) in &response.files {
                println!("  {} {}", path, format!("({} bytes)", content.len()).dimmed());
            }
        }
    }

    Ok(())
}
