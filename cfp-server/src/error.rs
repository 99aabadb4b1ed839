//! Error types for cfp-server
//!
//! Every handler error renders as `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cfp_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or expired session token (401)
    #[error("Authentication required")]
    Unauthenticated,

    /// Request body or parameter rejected before reaching the domain layer (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// cfp-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(err) => common_error_parts(err),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn common_error_parts(err: CommonError) -> (StatusCode, &'static str, String) {
    match err {
        CommonError::RatingValidation { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RATING", err.to_string())
        }
        CommonError::NotAuthorized => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED", err.to_string()),
        CommonError::SubmissionClosed => {
            (StatusCode::FORBIDDEN, "SUBMISSION_CLOSED", err.to_string())
        }
        CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        CommonError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CommonError::Database(_)
        | CommonError::Io(_)
        | CommonError::Config(_)
        | CommonError::Internal(_) => {
            error!("Request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            )
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(ApiError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(CommonError::RatingValidation { value: 7, scheme: "yesno" }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(CommonError::NotAuthorized.into()), StatusCode::FORBIDDEN);
        assert_eq!(status_of(CommonError::SubmissionClosed.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(CommonError::Conflict("dup".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CommonError::Internal("boom".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
