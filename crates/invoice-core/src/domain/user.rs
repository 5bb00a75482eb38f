// ============================================================================
// Invoice Core - User Entity
// File: crates/invoice-core/src/domain/user.rs
// Description: Registered account with optional pending password reset
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hash and expiry of an outstanding password reset token.
///
/// Both halves live in one value so a user can never carry a hash without an
/// expiry or the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenRecord {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetTokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub reset_token: Option<ResetTokenRecord>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            reset_token: None,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    /// Attach a pending reset token, replacing any earlier one.
    pub fn set_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.reset_token = Some(ResetTokenRecord {
            token_hash,
            expires_at,
        });
        self.modified_at = Some(Utc::now());
    }

    /// Replace the password and drop any pending reset token.
    pub fn change_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.reset_token = None;
        self.modified_at = Some(Utc::now());
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields safe to hand back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
