//! Mailer that records deliveries in the log instead of sending them.

use async_trait::async_trait;
use tracing::info;

use invoice_core::error::DomainError;
use invoice_core::ports::{Mailer, OutgoingMail};
use invoice_shared::utils::mask_email;

#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), DomainError> {
        // The body carries a live reset token and is never logged.
        info!(
            to = %mask_email(&mail.to),
            subject = %mail.subject,
            "Mail transport set to log; message not delivered"
        );
        Ok(())
    }
}
