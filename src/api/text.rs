//! Text-from-URL endpoint

use axum::{body::Bytes, extract::State, Json};
use validator::Validate;

use crate::api::{parse_body, validation_message};
use crate::error::ApiError;
use crate::schemas::openai::{ExtractedText, TextFromUrlBody};
use crate::server::state::AppState;
use crate::services::ExtractionError;

const DECODE_ERROR: &str = "Invalid request params";
const EXTRACTION_ERROR: &str = "Error extracting text from URL";

/// POST /getTextFromURL - Dump the readable text of a page
pub async fn text_from_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExtractedText>, ApiError> {
    let body: TextFromUrlBody = parse_body(&body, DECODE_ERROR)?;
    body.validate()
        .map_err(|e| ApiError::InvalidRequest(validation_message(&e)))?;

    tracing::info!(url = %body.url, "Processing text extraction request");

    let text = state
        .text_extractor
        .extract(&body.url)
        .await
        .map_err(|e| match e {
            ExtractionError::AccessDenied => ApiError::ExtractionDenied,
            other => {
                tracing::error!(error = %other, "Text extraction failed");
                ApiError::Extraction(EXTRACTION_ERROR.to_string())
            }
        })?;

    Ok(Json(ExtractedText { text }))
}
