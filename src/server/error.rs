//! Mapping of analysis failures onto HTTP responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use tracing::{error, warn};

use crate::analyzer::{AUTH_MESSAGE, AnalysisError, RATE_LIMIT_MESSAGE};

pub const BAD_REQUEST_MESSAGE: &str = "Please provide at least 3 notes for analysis";
pub const NOT_CONFIGURED_MESSAGE: &str = "OpenAI API key is not configured";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze notes. Please try again.";

/// Endpoint error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    NotConfigured,
    Unauthorized,
    RateLimited,
    MethodNotAllowed,
    /// Any other failure, with details for the client.
    Analysis(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::TooFewNotes { .. } => ApiError::BadRequest,
            AnalysisError::NotConfigured => ApiError::NotConfigured,
            AnalysisError::Auth { .. } => ApiError::Unauthorized,
            AnalysisError::RateLimit { .. } => ApiError::RateLimited,
            other @ (AnalysisError::MalformedResponse { .. } | AnalysisError::Failed { .. }) => {
                ApiError::Analysis(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": BAD_REQUEST_MESSAGE }),
            ),
            ApiError::NotConfigured => {
                error!("analysis requested but no OpenAI API key is configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": NOT_CONFIGURED_MESSAGE }),
                )
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": AUTH_MESSAGE }),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                serde_json::json!({ "error": RATE_LIMIT_MESSAGE }),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                serde_json::json!({ "error": "Method not allowed" }),
            ),
            ApiError::Analysis(details) => {
                warn!(%details, "analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": ANALYSIS_FAILED_MESSAGE, "details": details }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_statuses() {
        let cases = [
            (AnalysisError::TooFewNotes { count: 1 }, StatusCode::BAD_REQUEST),
            (AnalysisError::NotConfigured, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AnalysisError::Auth {
                    message: "x".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                AnalysisError::RateLimit {
                    message: "x".into(),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AnalysisError::malformed("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (AnalysisError::failed("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
