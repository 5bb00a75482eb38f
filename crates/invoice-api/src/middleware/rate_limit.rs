//! Login attempt limiter
//!
//! Keyed GCRA limiter: each caller starts with `max_attempts` and regains one
//! attempt per full `window`, so no window admits more than `max_attempts`.

use std::num::NonZeroU32;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::client_key;
use crate::state::AppState;

pub const LOGIN_RATE_LIMIT_MESSAGE: &str = "Too many login attempts, please try again later.";

pub struct LoginRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Record one attempt for `key`; `false` once the caller is over quota.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Drop callers whose quota has fully replenished.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers(), request.extensions());

    if !state.login_limiter.check(&key) {
        warn!(client = %key, "Login rate limit exceeded");
        return ApiError::TooManyRequests(LOGIN_RATE_LIMIT_MESSAGE.to_string()).into_response();
    }

    next.run(request).await
}
