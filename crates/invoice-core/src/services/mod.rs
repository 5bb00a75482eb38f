//! Domain services (business logic)

pub mod auth_service;
pub mod document_service;

pub use auth_service::{
    AuthService, AuthSettings, ForgotPasswordInput, LoginResult, RegisterInput,
    ResetPasswordInput,
};
pub use document_service::DocumentService;
