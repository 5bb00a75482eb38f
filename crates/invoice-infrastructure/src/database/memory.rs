//! In-process credential store for local development and tests.
//!
//! All mutations take the write lock, so each operation is atomic with
//! respect to every record.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use invoice_core::domain::User;
use invoice_core::error::DomainError;
use invoice_core::repositories::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn set_reset_token(
        &self,
        id: &Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(DomainError::UserNotFound)?;
        user.set_reset_token(token_hash.to_string(), expires_at);
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write().await;
        let holder = users.values_mut().find(|u| {
            u.reset_token
                .as_ref()
                .is_some_and(|r| r.token_hash == token_hash && !r.is_expired_at(now))
        });

        Ok(holder.map(|user| {
            user.change_password(new_password_hash.to_string());
            user.clone()
        }))
    }
}
