/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts automatically
/// into the wire shape: a status code from the error taxonomy and a JSON
/// body carrying a single human-readable `detail` string.
///
/// Taxonomy:
///
/// - 400 validation: malformed input, impossible dates, immutable-field or
///   terminal-state violations, duplicate email
/// - 401 authentication: missing/invalid/expired token, wrong credentials
/// - 403 authorization: authenticated but denied by policy
/// - 404 not found: referenced project/user/task/assignee does not exist
/// - 500 unexpected: everything else; internals are logged, never leaked

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskboard_shared::auth::jwt::JwtError;
use taskboard_shared::auth::password::PasswordError;
use taskboard_shared::auth::policy::PolicyError;
use taskboard_shared::dates::DateError;
use taskboard_shared::models::task::TaskUpdateError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - validation failures
    BadRequest(String),

    /// Unauthorized (401) - authentication failures
    Unauthorized(String),

    /// Forbidden (403) - policy denials
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    Internal(String),
}

/// Error response body
///
/// Every error endpoint response is this one shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub detail: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                // Log the real cause; clients only see a generic message
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations on the users email column surface as a
/// duplicate-email validation error rather than a raw 500.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource was not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::BadRequest("Email is already in use".to_string());
                    }
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::CreateError(msg) => ApiError::Internal(msg),
            JwtError::ValidationError(_) => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert policy denials to API errors
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

/// Convert calendar-date parse errors to API errors
impl From<DateError> for ApiError {
    fn from(err: DateError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Convert rejected task updates to API errors
impl From<TaskUpdateError> for ApiError {
    fn from(err: TaskUpdateError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Convert request-DTO validation failures to API errors
///
/// Field messages are joined into the single `detail` string.
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();

        ApiError::BadRequest(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_detail(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        (status, parsed.detail)
    }

    #[tokio::test]
    async fn test_status_codes() {
        let (status, _) = body_detail(ApiError::BadRequest("bad".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = body_detail(ApiError::Unauthorized("no".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = body_detail(ApiError::Forbidden("no".to_string())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = body_detail(ApiError::NotFound("missing".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_errors_never_leak_detail() {
        let (status, detail) =
            body_detail(ApiError::Internal("connection refused at 10.0.0.3".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "Something went wrong");
    }

    #[tokio::test]
    async fn test_detail_carries_specific_message() {
        let (_, detail) =
            body_detail(ApiError::BadRequest("due_date must be YYYY-MM-DD format".to_string()))
                .await;

        assert_eq!(detail, "due_date must be YYYY-MM-DD format");
    }

    #[test]
    fn test_policy_error_maps_to_forbidden() {
        let err: ApiError = PolicyError::AdminRequired.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_task_update_error_maps_to_bad_request() {
        let err: ApiError = TaskUpdateError::TerminalState.into();
        match err {
            ApiError::BadRequest(msg) => {
                assert_eq!(msg, "Task in done status cannot be reopened");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }
}
