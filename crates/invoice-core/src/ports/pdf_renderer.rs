//! HTML to PDF rendering port

use async_trait::async_trait;

use crate::error::DomainError;

/// Headless-browser renderer. Implementations load `html`, wait for the page
/// load event and print it to PDF.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, DomainError>;
}
