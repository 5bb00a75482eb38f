//! Invoice document handlers

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::dto::GeneratePdfRequest;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Generate PDF handler - POST /api/invoices/generate-pdf
pub async fn generate_pdf(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GeneratePdfRequest>,
) -> Result<Response, ApiError> {
    let pdf = state
        .document_service
        .generate_pdf(payload.html_content.as_deref())
        .await?;

    info!(user_id = %claims.id, bytes = pdf.len(), "Invoice PDF generated");
    Ok((
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "inline; filename=invoice.pdf"),
        ],
        pdf,
    )
        .into_response())
}
