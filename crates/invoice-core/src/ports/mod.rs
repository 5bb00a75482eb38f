//! Outbound ports for collaborators outside the credential store

pub mod mailer;
pub mod pdf_renderer;

pub use mailer::{Mailer, OutgoingMail};
pub use pdf_renderer::PdfRenderer;
#[cfg(test)]
pub use mailer::MockMailer;
#[cfg(test)]
pub use pdf_renderer::MockPdfRenderer;
