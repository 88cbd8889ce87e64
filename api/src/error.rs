use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use validation::{ErrorName, NormalizedError};

/// API Error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// A domain error that is reported to the client as is
    #[error("{0}")]
    Domain(NormalizedError),

    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub code: u16,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl ApiError {
    /// Shorthand for a domain error with the plain template message
    pub fn named(name: ErrorName) -> Self {
        ApiError::Domain(NormalizedError::new(name))
    }

    /// The domain error this error is reported as
    pub fn normalized(&self) -> NormalizedError {
        match self {
            ApiError::Domain(err) => err.clone(),
            ApiError::Database(_) | ApiError::Internal(_) => NormalizedError::new(ErrorName::Unknown),
        }
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Only validation raises UNKNOWN as a domain error, for mistyped input
            ApiError::Domain(err) if err.name == ErrorName::Unknown => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => status_for(err.name),
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status for a domain error name
pub fn status_for(name: ErrorName) -> StatusCode {
    use ErrorName::*;

    match name {
        Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        LoggedOut | InvalidCredentials => StatusCode::UNAUTHORIZED,
        NotOwner => StatusCode::FORBIDDEN,
        Account404 | Post404 | Server404 | Channel404 | Message404 | Role404 => {
            StatusCode::NOT_FOUND
        }
        EmailTaken | IdTaken | AlreadyInServer | FriendAlreadySent | FriendAlreadyPending
        | FriendAlreadyAccepted | AlreadyPinned => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(err) = &self {
            error!("Database error while handling request: {}", err);
        } else if let ApiError::Internal(msg) = &self {
            error!("Internal error while handling request: {}", msg);
        }

        let status = self.status_code();
        let err = self.normalized();
        let error_response = ApiErrorResponse {
            error: ErrorDetail {
                message: err.message,
                code: err.code,
                name: err.name.as_str().to_string(),
                extras: err.extras.map(serde_json::Value::Object),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<NormalizedError> for ApiError {
    fn from(err: NormalizedError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ErrorName> for ApiError {
    fn from(name: ErrorName) -> Self {
        ApiError::named(name)
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
