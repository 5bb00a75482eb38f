//! HTTP error mapping
//!
//! Every failure leaves the API as `{ "message": ..., ...details }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use invoice_core::error::{DomainError, FieldViolation};

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => {
                tracing::warn!("Validation failed: {} field(s)", errors.len());
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "message": "Validation failed", "errors": errors }),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "message": msg }))
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, json!({ "message": msg }))
            }
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, json!({ "message": msg }))
            }
            ApiError::TooManyRequests(msg) => {
                tracing::warn!("Too many requests: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, json!({ "message": msg }))
            }
            ApiError::RenderFailed(detail) => {
                tracing::error!("Error generating PDF: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Failed to generate PDF.", "error": detail }),
                )
            }
            ApiError::InternalError(detail) => {
                // Detail stays in the log; clients get a generic message.
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => ApiError::Validation(violations),
            DomainError::EmailAlreadyExists(_)
            | DomainError::InvalidResetToken
            | DomainError::EmptyDocument => ApiError::BadRequest(err.to_string()),
            DomainError::UserNotFound => ApiError::NotFound(err.to_string()),
            DomainError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            DomainError::RenderError(detail) => ApiError::RenderFailed(detail),
            DomainError::MailDeliveryError(_)
            | DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::DatabaseError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
