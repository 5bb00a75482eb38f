//! Domain errors

use serde::Serialize;
use thiserror::Error;

/// One failed input rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("User already exists")]
    EmailAlreadyExists(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    #[error("HTML content is required.")]
    EmptyDocument,

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Mail delivery error: {0}")]
    MailDeliveryError(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldViolation {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(violations)
    }
}
