//! API error types and HTTP response conversion.
//!
//! Every error body is `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ResolveError;

/// API error response structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request data
    #[error("{0}")]
    BadRequest(String),

    /// Nothing could answer the request
    #[error("{0}")]
    ServiceUnavailable(String),

    /// The browsing agent failed
    #[error("{0}")]
    EscalationFailed(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) | ApiError::EscalationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code identifier
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::EscalationFailed(_) => "ESCALATION_FAILED",
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InputError(msg) => ApiError::BadRequest(msg),
            ResolveError::ServiceUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            failure @ ResolveError::EscalationFailure(_) => {
                ApiError::EscalationFailed(failure.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorResponse::new(self.to_string());

        tracing::error!(code = self.code(), status = status.as_u16(), error = %body.error, "API error");

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_is_bad_request() {
        let err = ApiError::from(ResolveError::InputError("no disease".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BAD_REQUEST");
        assert_eq!(err.to_string(), "no disease");
    }

    #[test]
    fn test_escalation_failure_keeps_prefix() {
        let err = ApiError::from(ResolveError::EscalationFailure("browser crashed".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Proxy AI failed: browser crashed");
    }

    #[test]
    fn test_service_unavailable_is_internal() {
        let err = ApiError::from(ResolveError::ServiceUnavailable("model down".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
    }
}
