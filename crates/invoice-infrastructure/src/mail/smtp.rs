// ============================================================================
// Invoice Infrastructure - SMTP Mailer
// File: crates/invoice-infrastructure/src/mail/smtp.rs
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

use invoice_core::error::DomainError;
use invoice_core::ports::{Mailer, OutgoingMail};
use invoice_shared::config::EmailSettings;
use invoice_shared::utils::mask_email;

use crate::error::InfraError;

/// Port used for implicit TLS; anything else negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &EmailSettings) -> Result<Self, InfraError> {
        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.username)
            .parse()
            .map_err(|e| InfraError::Mail(format!("Invalid from address: {}", e)))?;

        let builder = if settings.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        }
        .map_err(|e| InfraError::Mail(format!("Failed to create SMTP transport: {}", e)))?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .build();

        Ok(Self { transport, from })
    }
}

fn build_message(from: &Mailbox, mail: &OutgoingMail) -> Result<Message, DomainError> {
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| DomainError::MailDeliveryError(format!("Invalid to address: {}", e)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body.clone())
        .map_err(|e| DomainError::MailDeliveryError(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), DomainError> {
        debug!(to = %mask_email(&mail.to), subject = %mail.subject, "Sending email");

        let message = build_message(&self.from, &mail)?;
        self.transport.send(message).await.map_err(|e| {
            error!("SMTP delivery failed: {}", e);
            DomainError::MailDeliveryError(e.to_string())
        })?;

        info!(to = %mask_email(&mail.to), subject = %mail.subject, "Email sent successfully");
        Ok(())
    }
}
