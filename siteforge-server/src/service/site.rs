//! Site Service
//!
//! Validates site requests, resolves their sources and runs the pipeline.

use siteforge_builder::PipelineError;
use siteforge_core::domain::business::BusinessProfile;
use siteforge_core::domain::deployment::SiteIdentity;
use siteforge_core::domain::pipeline::PipelineReport;
use siteforge_core::domain::site::{ArtifactSet, SourceFileSet};
use siteforge_core::dto::site::{BuildSiteRequest, DeploySiteRequest};

use crate::generator::SiteGenerator;
use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum SiteError {
    ValidationError(String),
    PipelineError(PipelineError),
}

impl From<PipelineError> for SiteError {
    fn from(err: PipelineError) -> Self {
        SiteError::PipelineError(err)
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

/// Build and deploy a site
///
/// Pipeline failures are part of the returned report; only invalid
/// requests are errors.
pub async fn deploy_site(state: &AppState, req: DeploySiteRequest) -> Result<PipelineReport> {
    validate_business(&req.business)?;
    let files = resolve_sources(state.generator.as_ref(), &req.business, req.files)?;

    let identity = SiteIdentity {
        name: req.business.name.clone(),
        site_id: req.site_id.filter(|id| !id.trim().is_empty()),
    };

    let report = state.pipeline.run(&identity, &files).await;

    tracing::info!(
        "Deploy {} for '{}' finished at stage {}",
        report.invocation_id,
        identity.name,
        report.reached
    );

    Ok(report)
}

/// Build a site without deploying it and return the harvested files
pub async fn build_site(state: &AppState, req: BuildSiteRequest) -> Result<ArtifactSet> {
    validate_business(&req.business)?;
    let files = resolve_sources(state.generator.as_ref(), &req.business, req.files)?;

    let artifacts = state.pipeline.build(&req.business.name, &files).await?;
    Ok(artifacts)
}

/// Explicit files win over generated ones
fn resolve_sources(
    generator: &dyn SiteGenerator,
    business: &BusinessProfile,
    files: Option<SourceFileSet>,
) -> Result<SourceFileSet> {
    match files {
        Some(files) if files.is_empty() => Err(SiteError::ValidationError(
            "Source file set cannot be empty".to_string(),
        )),
        Some(files) => Ok(files),
        None => Ok(generator.generate(business)),
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_business(business: &BusinessProfile) -> Result<()> {
    if business.name.trim().is_empty() {
        return Err(SiteError::ValidationError(
            "Business name cannot be empty".to_string(),
        ));
    }

    if business.name.len() > 255 {
        return Err(SiteError::ValidationError(
            "Business name is too long (max 255 characters)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticExportGenerator;

    #[test]
    fn test_validate_empty_name() {
        let result = validate_business(&BusinessProfile::named("   "));
        assert!(matches!(result, Err(SiteError::ValidationError(_))));
    }

    #[test]
    fn test_validate_long_name() {
        let result = validate_business(&BusinessProfile::named("x".repeat(256)));
        assert!(matches!(result, Err(SiteError::ValidationError(_))));
    }

    #[test]
    fn test_validate_valid_name() {
        assert!(validate_business(&BusinessProfile::named("Acme Plumbing")).is_ok());
    }

    #[test]
    fn test_explicit_files_bypass_generator() {
        let mut files = SourceFileSet::new();
        files.insert("index.html".to_string(), "<html></html>".to_string());

        let resolved = resolve_sources(
            &StaticExportGenerator::new(),
            &BusinessProfile::named("Acme"),
            Some(files.clone()),
        )
        .unwrap();
        assert_eq!(resolved, files);
    }

    #[test]
    fn test_empty_files_rejected() {
        let result = resolve_sources(
            &StaticExportGenerator::new(),
            &BusinessProfile::named("Acme"),
            Some(SourceFileSet::new()),
        );
        assert!(matches!(result, Err(SiteError::ValidationError(_))));
    }

    #[test]
    fn test_missing_files_are_generated() {
        let resolved = resolve_sources(
            &StaticExportGenerator::new(),
            &BusinessProfile::named("Acme"),
            None,
        )
        .unwrap();
        assert!(resolved.contains_key("package.json"));
    }
}
