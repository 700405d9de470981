//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entities::EventError;
use forms::{error_codes, Errors};
use serde_json::json;
use study_store::StoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A submitted form failed validation.
    #[error("Validation failed: {0}")]
    Validation(Errors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// An event or enrollment rule was violated.
    #[error(transparent)]
    Domain(#[from] EventError),

    /// The resource kept changing while it was being updated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates a validation error for a single field.
    pub fn field(field: &str, code: &str, message: &str) -> Self {
        let mut errors = Errors::new();
        errors.reject_value(field, code, message);
        Self::Validation(errors)
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST),
            ServerError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::VALIDATION_FAILED,
            ),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND),
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_REQUIRED,
            ),
            ServerError::PermissionDenied(_) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            ServerError::Domain(e) => match e {
                EventError::InvalidSchedule(_) | EventError::NotConfirmative => {
                    (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST)
                }
                EventError::EnrollmentNotFound(_) => {
                    (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND)
                }
                _ => (StatusCode::CONFLICT, error_codes::CONFLICT),
            },
            ServerError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
            ServerError::Store(e) => match e {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND),
                StoreError::AlreadyExists { .. } | StoreError::Conflict { .. } => {
                    (StatusCode::CONFLICT, error_codes::CONFLICT)
                }
                StoreError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
            },
            ServerError::Auth(auth::AuthError::Hashing(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
            ServerError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_REQUIRED,
            ),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match &self {
            ServerError::Validation(errors) => json!({
                "error": {
                    "code": error_code,
                    "message": "Validation failed",
                    "fields": errors,
                }
            }),
            _ => json!({
                "error": {
                    "code": error_code,
                    "message": self.to_string(),
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
