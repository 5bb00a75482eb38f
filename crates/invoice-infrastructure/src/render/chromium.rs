// ============================================================================
// Invoice Infrastructure - Chromium PDF Renderer
// File: crates/invoice-infrastructure/src/render/chromium.rs
// Description: Client for a Gotenberg-compatible headless Chromium service
// ============================================================================
//! The service loads the uploaded `index.html`, waits for the page load event
//! and prints it as a single A4 document with backgrounds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, error};

use invoice_core::error::DomainError;
use invoice_core::ports::PdfRenderer;
use invoice_shared::config::RendererSettings;

use crate::error::InfraError;

const CONVERT_HTML_PATH: &str = "/forms/chromium/convert/html";

// A4 in inches
const A4_WIDTH_IN: &str = "8.27";
const A4_HEIGHT_IN: &str = "11.7";

#[derive(Clone)]
pub struct ChromiumPdfRenderer {
    client: Client,
    endpoint: String,
}

impl ChromiumPdfRenderer {
    pub fn new(settings: &RendererSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| InfraError::Renderer(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                settings.base_url.trim_end_matches('/'),
                CONVERT_HTML_PATH
            ),
        })
    }

    fn form(html: &str) -> Result<Form, DomainError> {
        let page = Part::text(html.to_string())
            .file_name("index.html")
            .mime_str("text/html")
            .map_err(|e| DomainError::RenderError(e.to_string()))?;

        Ok(Form::new()
            .part("files", page)
            .text("paperWidth", A4_WIDTH_IN)
            .text("paperHeight", A4_HEIGHT_IN)
            .text("printBackground", "true"))
    }
}

#[async_trait]
impl PdfRenderer for ChromiumPdfRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, DomainError> {
        debug!("Rendering {} bytes of HTML via {}", html.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(html)?)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach PDF renderer: {}", e);
                DomainError::RenderError(format!("Failed to reach renderer: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::RenderError(format!(
                "Renderer error: {} - {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::RenderError(format!("Failed to read PDF: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
