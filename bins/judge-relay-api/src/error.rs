use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use judge_relay_engine::{ErrorKind, RelayError};
use serde::Serialize;
use tracing::{error, warn};

use crate::metrics;

const CONNECTION_MESSAGE: &str = "Cannot connect to Judge0 service. Please ensure it is running.";
const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Body returned by every endpoint on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    /// Machine-readable code: `VALIDATION_ERROR`, `NOT_FOUND`, `RATE_LIMITED`,
    /// `BACKEND_UNAVAILABLE`, `BACKEND_ERROR` or `EXTRACTION_FAILED`.
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound { method: String, path: String },
    RateLimited,
    /// A core failure, with the summary shown to the caller
    Relay {
        summary: &'static str,
        source: RelayError,
    },
}

impl ApiError {
    pub fn relay(summary: &'static str, source: RelayError) -> Self {
        ApiError::Relay { summary, source }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    success: false,
                    error: "Validation error".into(),
                    code: "VALIDATION_ERROR",
                    message,
                },
            ),
            ApiError::NotFound { method, path } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    success: false,
                    error: "Route not found".into(),
                    code: "NOT_FOUND",
                    message: format!("Cannot {method} {path}"),
                },
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    success: false,
                    error: "Too Many Requests".into(),
                    code: "RATE_LIMITED",
                    message: RATE_LIMIT_MESSAGE.into(),
                },
            ),
            ApiError::Relay { summary, source } => {
                let kind = source.kind();
                metrics::track_failure(kind.code());
                let (status, error, message) = match kind {
                    ErrorKind::Unavailable => {
                        error!(error = %source, "Execution backend unreachable");
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            "Connection Error".to_string(),
                            CONNECTION_MESSAGE.to_string(),
                        )
                    }
                    ErrorKind::Backend => {
                        warn!(error = %source, "Execution backend rejected request");
                        (StatusCode::BAD_GATEWAY, summary.to_string(), source.to_string())
                    }
                    ErrorKind::Extraction => {
                        warn!(error = %source, "Harvest extraction failed");
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            summary.to_string(),
                            source.to_string(),
                        )
                    }
                };
                (
                    status,
                    ErrorBody {
                        success: false,
                        error,
                        code: kind.code(),
                        message,
                    },
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::NotFound {
                    method: "GET".into(),
                    path: "/nope".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                ApiError::relay(
                    "Failed to get submission result",
                    RelayError::unavailable(
                        "get submission",
                        std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
                    ),
                ),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::relay(
                    "Failed to create submission",
                    RelayError::backend("create submission", Some(422), "bad language"),
                ),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::relay(
                    "Failed to create submission",
                    RelayError::Extraction {
                        operation: "create submission with actual as expected",
                        message: "No raw output found to use as expected output".into(),
                    },
                ),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_backend_message_reaches_caller() {
        let (_, body) = ApiError::relay(
            "Failed to create submission",
            RelayError::backend("create submission", Some(422), "language with id 999 doesn't exist"),
        )
        .status_and_body();

        assert!(!body.success);
        assert_eq!(body.error, "Failed to create submission");
        assert_eq!(body.code, "BACKEND_ERROR");
        assert!(body.message.contains("language with id 999 doesn't exist"));
    }

    #[test]
    fn test_not_found_message() {
        let (_, body) = ApiError::NotFound {
            method: "DELETE".into(),
            path: "/api/unknown".into(),
        }
        .status_and_body();
        assert_eq!(body.message, "Cannot DELETE /api/unknown");
    }
}
