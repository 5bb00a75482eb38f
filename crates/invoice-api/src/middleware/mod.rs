//! Request middleware

pub mod auth_gate;
pub mod rate_limit;

pub use auth_gate::{AuthGate, Authenticated, GateOutcome, GateRejection};
pub use rate_limit::{login_rate_limit, LoginRateLimiter};
