use std::sync::Arc;

use invoice_core::services::{AuthService, DocumentService};

use crate::middleware::{AuthGate, LoginRateLimiter};

/// Everything a request handler can reach. Built once at startup; tests build
/// their own isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub document_service: Arc<DocumentService>,
    pub auth_gate: Arc<AuthGate>,
    pub login_limiter: Arc<LoginRateLimiter>,
}
