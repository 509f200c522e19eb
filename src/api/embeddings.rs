//! Embedding endpoint

use axum::{body::Bytes, extract::State, Json};

use crate::api::{parse_body, upstream_error};
use crate::error::ApiError;
use crate::schemas::openai::{EmbeddingBody, EmbeddingData};
use crate::server::state::AppState;

const DECODE_ERROR: &str = "Error decoding request body";
const INVALID_INPUT: &str =
    r#"Invalid Input: please provide a valid array of string(s) as input, e.g. {"input": ["Hello there"]}"#;
const TRANSPORT_ERROR: &str = "Error creating embeddings";
const NO_EMBEDDINGS: &str = "No embeddings in OpenAI response";

/// POST /createEmbedding - Embed one or more strings
///
/// `input` must be a non-empty array of strings; a lone empty string counts
/// as no input.
pub async fn create_embedding(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<EmbeddingData>>, ApiError> {
    let body: EmbeddingBody = parse_body(&body, DECODE_ERROR)?;
    let request = body
        .into_request()
        .ok_or_else(|| ApiError::InvalidRequest(INVALID_INPUT.to_string()))?;

    tracing::info!(
        model = %request.model,
        input_count = request.input.len(),
        "Processing embedding request"
    );

    let embeddings = state
        .upstream
        .create_embedding(request)
        .await
        .map_err(|e| upstream_error(e, TRANSPORT_ERROR))?;

    if embeddings.data.is_empty() {
        return Err(ApiError::UpstreamEmpty(NO_EMBEDDINGS.to_string()));
    }

    Ok(Json(embeddings.data))
}
