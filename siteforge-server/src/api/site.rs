//! Site API Handlers
//!
//! HTTP endpoints for building and deploying sites.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use siteforge_core::domain::pipeline::{PipelineReport, PipelineStage};
use siteforge_core::dto::site::{
    BuildSiteRequest, BuildSiteResponse, DeploySiteRequest, DeploySiteResponse,
};

use crate::api::error::ApiResult;
use crate::service::site_service;
use crate::state::AppState;

/// POST /api/site/deploy
/// Build a site and deploy it to the hosting provider
pub async fn deploy_site(
    State(state): State<AppState>,
    payload: Result<Json<DeploySiteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DeploySiteResponse>)> {
    let Json(req) = payload?;
    tracing::info!("Deploying site for: {}", req.business.name);

    let report = site_service::deploy_site(&state, req).await?;

    Ok((report_status(&report), Json(report_response(report))))
}

/// POST /api/site/build
/// Build a site and return the generated files without deploying
pub async fn build_site(
    State(state): State<AppState>,
    payload: Result<Json<BuildSiteRequest>, JsonRejection>,
) -> ApiResult<Json<BuildSiteResponse>> {
    let Json(req) = payload?;
    tracing::info!("Building site for: {}", req.business.name);

    let files = site_service::build_site(&state, req).await?;

    Ok(Json(BuildSiteResponse {
        success: true,
        files,
    }))
}

/// Upstream (hosting) failures are 502, everything else that failed is 500
fn report_status(report: &PipelineReport) -> StatusCode {
    if report.succeeded() {
        StatusCode::OK
    } else if report.reached >= PipelineStage::Harvested {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn report_response(report: PipelineReport) -> DeploySiteResponse {
    let succeeded = report.succeeded();
    let response: DeploySiteResponse = report.result.into();

    if succeeded {
        response
    } else {
        DeploySiteResponse {
            reached_stage: Some(report.reached),
            ..response
        }
    }
}
