//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use siteforge_builder::PipelineError;
use siteforge_core::dto::site::DeploySiteResponse;

use crate::service::site_service::SiteError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PipelineError(PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PipelineError(err) => {
                tracing::error!("Pipeline error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.user_message().to_string(),
                )
            }
        };

        (status, Json(DeploySiteResponse::failure(message, None))).into_response()
    }
}

impl From<SiteError> for ApiError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::ValidationError(msg) => ApiError::BadRequest(msg),
            SiteError::PipelineError(err) => ApiError::PipelineError(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
