//! Chat completion endpoint
//!
//! POST /chatCompletion relays a conversation to the provider and answers
//! with the message of the first returned choice.

use axum::{body::Bytes, extract::State, Json};
use validator::Validate;

use crate::api::{parse_body, upstream_error, validation_message};
use crate::error::ApiError;
use crate::schemas::openai::{ChatCompletionBody, ChatCompletionRequest, ChatMessage};
use crate::server::state::AppState;

const DECODE_ERROR: &str = "Error decoding request body";
const TRANSPORT_ERROR: &str = "Error getting chat completion";
const NO_CHOICES: &str = "No choices in OpenAI response";

/// POST /chatCompletion - Create a chat completion
///
/// Omitted sampling parameters are filled with the relay defaults before
/// the request goes upstream. At least one message is required.
pub async fn chat_completion(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatMessage>, ApiError> {
    let body: ChatCompletionBody = parse_body(&body, DECODE_ERROR)?;
    body.validate()
        .map_err(|e| ApiError::InvalidRequest(validation_message(&e)))?;

    let request = ChatCompletionRequest::from(body);

    tracing::info!(
        model = %request.model,
        message_count = request.messages.len(),
        max_tokens = request.max_tokens,
        "Processing chat completion request"
    );

    let completion = state
        .upstream
        .chat_completion(request)
        .await
        .map_err(|e| upstream_error(e, TRANSPORT_ERROR))?;

    completion
        .into_first_message()
        .map(Json)
        .ok_or_else(|| ApiError::UpstreamEmpty(NO_CHOICES.to_string()))
}
