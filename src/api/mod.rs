//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations plus the small
//! decoding helpers they share.

pub mod chat_completions;
pub mod embeddings;
pub mod health;
pub mod images;
pub mod root;
pub mod text;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use validator::ValidationErrors;

use crate::error::ApiError;
use crate::services::UpstreamError;

/// Decode a JSON request body, answering 400 with `message` on failure
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes, message: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::InvalidRequest(message.to_string())
    })
}

/// First message attached to a failed validation rule
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// Map a provider failure onto the caller-facing error
///
/// Details stay in the logs; the caller only sees `transport_message` or the
/// generic decode message.
pub(crate) fn upstream_error(err: UpstreamError, transport_message: &str) -> ApiError {
    match err {
        UpstreamError::Decode(_) => ApiError::UpstreamDecode,
        other => {
            tracing::error!(error = %other, "Upstream call failed");
            ApiError::UpstreamTransport(transport_message.to_string())
        }
    }
}
