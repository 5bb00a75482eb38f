//! User repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;

/// Credential store. Every method touches exactly one user record and must be
/// atomic with respect to that record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `email` is expected in normalised form.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user. Fails with `EmailAlreadyExists` when the email is taken.
    async fn create(&self, user: &User) -> Result<User, DomainError>;

    /// Store a reset token for user `id`, replacing any previous one. Only the
    /// token fields are written; the password hash is left as stored.
    async fn set_reset_token(
        &self,
        id: &Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Find the user holding `token_hash` with an expiry after `now`, replace
    /// its password hash with `new_password_hash` and clear the reset token,
    /// all in one step. Returns `None` when no live token matches.
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError>;
}
