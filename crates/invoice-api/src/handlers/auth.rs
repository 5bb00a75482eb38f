// ============================================================================
// Invoice API - Auth Handlers
// File: crates/invoice-api/src/handlers/auth.rs
// ============================================================================
//! Account handlers (register, login, forgot and reset password)

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest,
};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Register handler - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.auth_service.register(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Login handler - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token: result.token,
        user: result.user,
    }))
}

/// Forgot password handler - POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.forgot_password(payload.into()).await?;
    Ok(Json(MessageResponse::new("Password reset email sent!")))
}

/// Reset password handler - POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.reset_password(payload.into()).await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// Liveness probe for the auth router - GET /api/auth/test
pub async fn test_route() -> Json<MessageResponse> {
    Json(MessageResponse::new("Auth route is working!"))
}
