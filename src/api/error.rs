//! Request-terminating errors and their HTTP mapping.

use crate::{
    api::validation::FieldError,
    auth::{PasswordError, TokenError},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

pub const MSG_NOT_FOUND: &str = "User not found";
pub const MSG_NO_TOKEN: &str = "No token provided";
pub const MSG_INVALID_TOKEN: &str = "Invalid token";
pub const MSG_EMAIL_EXISTS: &str = "Email already exists";
pub const MSG_CREDENTIALS_REQUIRED: &str = "Email and password are required";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";

/// `{message}` body used by every non-validation error.
#[derive(ToSchema, Serialize, Debug)]
pub struct Message {
    #[schema(example = "User not found")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{errors: [...]}` body for rejected create/update requests.
#[derive(ToSchema, Serialize, Debug)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    ValidationFailed(Vec<FieldError>),
    #[error("not found")]
    NotFound,
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::Unauthenticated(MSG_NO_TOKEN),
            TokenError::Invalid(reason) => Self::Forbidden(reason),
            TokenError::Signing(reason) => Self::Internal(reason),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationFailed(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationErrors { errors })).into_response()
            }
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(Message::new(MSG_NOT_FOUND))).into_response()
            }
            Self::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, Json(Message::new(message))).into_response()
            }
            // The reason is for logs only.
            Self::Forbidden(_) => {
                (StatusCode::FORBIDDEN, Json(Message::new(MSG_INVALID_TOKEN))).into_response()
            }
            Self::Conflict(message) | Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(Message::new(message))).into_response()
            }
            Self::Internal(reason) => {
                error!("Internal error: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Message::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_map_to_distinct_statuses() {
        assert_eq!(
            ApiError::from(TokenError::Missing).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(TokenError::Invalid("bad signature".to_string()))
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(TokenError::Signing("boom".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflict_is_a_bad_request() {
        assert_eq!(
            ApiError::Conflict(MSG_EMAIL_EXISTS).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }
}
