//! HTTP response DTOs and error-kind to status mapping.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ServiceError;

/// Response carrying the identifier an operation acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    /// The record identifier.
    pub uuid: Uuid,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// API error response.
///
/// Carries a stable code and a short human-readable reason; internal error
/// strings never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ApiErrorResponse {
    /// Build the wire body for a surfaced error kind.
    #[must_use]
    pub fn from_error(err: &ServiceError) -> Self {
        Self {
            code: error_code(err).to_string(),
            message: err.to_string(),
        }
    }
}

/// Each surfaced error kind corresponds to exactly one transport status.
#[must_use]
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict | ServiceError::InconsistentId => StatusCode::BAD_REQUEST,
        ServiceError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn error_code(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::NotFound => "NOT_FOUND",
        ServiceError::Conflict => "CONFLICT",
        ServiceError::InconsistentId => "INCONSISTENT_ID",
        ServiceError::Unavailable => "UNAVAILABLE",
    }
}
