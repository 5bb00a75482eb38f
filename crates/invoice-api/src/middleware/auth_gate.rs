// ============================================================================
// Invoice API - Auth Gate
// File: crates/invoice-api/src/middleware/auth_gate.rs
// ============================================================================
//! Session token check for protected routes.
//!
//! The gate produces an explicit [`GateOutcome`]; handlers receive the claims
//! through the [`Authenticated`] extractor, which runs before the body is read.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tracing::debug;

use invoice_security::{JwtService, SessionClaims};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    MissingToken,
    InvalidToken,
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::MissingToken => {
                ApiError::Unauthorized("Access denied. No token provided.".to_string())
            }
            GateRejection::InvalidToken => ApiError::BadRequest("Invalid token.".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Authorized(SessionClaims),
    Rejected(GateRejection),
}

pub struct AuthGate {
    tokens: Arc<JwtService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<JwtService>) -> Self {
        Self { tokens }
    }

    pub fn check(&self, headers: &HeaderMap) -> GateOutcome {
        // The token is the second word of the header, e.g. `Bearer <token>`.
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split_whitespace().nth(1));

        let Some(token) = token else {
            return GateOutcome::Rejected(GateRejection::MissingToken);
        };

        match self.tokens.verify(token) {
            Some(claims) => GateOutcome::Authorized(claims),
            None => {
                debug!("Rejected session token");
                GateOutcome::Rejected(GateRejection::InvalidToken)
            }
        }
    }
}

/// Verified session identity of the caller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionClaims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.auth_gate.check(&parts.headers) {
            GateOutcome::Authorized(claims) => Ok(Authenticated(claims)),
            GateOutcome::Rejected(rejection) => Err(rejection.into()),
        }
    }
}
