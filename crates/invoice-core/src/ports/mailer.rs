//! Mail delivery port

use async_trait::async_trait;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `mail`. Failures surface as `DomainError::MailDeliveryError`.
    async fn send(&self, mail: OutgoingMail) -> Result<(), DomainError>;
}
