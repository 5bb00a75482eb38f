//! Request and response bodies
//!
//! Request fields default to empty so that a missing field is reported by
//! validation rather than as a JSON shape error.

use serde::{Deserialize, Serialize};

use invoice_core::domain::PublicUser;
use invoice_core::services::{ForgotPasswordInput, RegisterInput, ResetPasswordInput};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl From<ForgotPasswordRequest> for ForgotPasswordInput {
    fn from(req: ForgotPasswordRequest) -> Self {
        ForgotPasswordInput { email: req.email }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl From<ResetPasswordRequest> for ResetPasswordInput {
    fn from(req: ResetPasswordRequest) -> Self {
        ResetPasswordInput {
            token: req.token,
            password: req.password,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    pub html_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}
