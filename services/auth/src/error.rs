//! Custom error types for the authentication service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::{DatabaseError, FieldError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing or invalid bearer token, or an inactive user
    #[error("Unauthorized")]
    Unauthorized,

    /// Wrong email or password on token request
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A field failed validation
    #[error("{0}")]
    Validation(FieldError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<FieldError> for AuthError {
    fn from(err: FieldError) -> Self {
        AuthError::Validation(err)
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication credentials were not provided or are invalid" }),
            ),
            AuthError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Unable to authenticate. Check email and password." }),
            ),
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AuthError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.message, "field": err.field }),
            ),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
            AuthError::Database(DatabaseError::Conflict(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AuthError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
