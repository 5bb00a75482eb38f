// ============================================================================
// Invoice Core - Document Service
// File: crates/invoice-core/src/services/document_service.rs
// Description: Turns caller-supplied invoice HTML into a PDF
// ============================================================================

use std::sync::Arc;

use tracing::{error, info};

use crate::error::DomainError;
use crate::ports::PdfRenderer;

pub struct DocumentService {
    renderer: Arc<dyn PdfRenderer>,
}

impl DocumentService {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self { renderer }
    }

    /// Render `html` as a single A4 PDF.
    ///
    /// Missing or blank input is rejected before the renderer is touched.
    pub async fn generate_pdf(&self, html: Option<&str>) -> Result<Vec<u8>, DomainError> {
        let html = match html {
            Some(html) if !html.trim().is_empty() => html,
            _ => return Err(DomainError::EmptyDocument),
        };

        let pdf = self.renderer.render(html).await.map_err(|e| {
            error!("PDF rendering failed: {}", e);
            e
        })?;

        if pdf.is_empty() {
            error!("PDF renderer returned an empty document");
            return Err(DomainError::RenderError("Generated PDF is empty.".to_string()));
        }

        info!("Generated PDF ({} bytes) from {} bytes of HTML", pdf.len(), html.len());
        Ok(pdf)
    }
}
