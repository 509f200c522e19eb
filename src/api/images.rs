//! Image generation endpoint

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::api::upstream_error;
use crate::error::ApiError;
use crate::schemas::openai::{ImageData, ImageGenerationBody, ImageGenerationRequest};
use crate::server::state::AppState;

const TRANSPORT_ERROR: &str = "Error generating image";
const NO_IMAGES: &str = "No images in OpenAI response";

/// POST /generateImage - Generate images from a prompt
///
/// Never rejects its body. Malformed JSON counts as an empty object, and a
/// field of the wrong type is ignored without discarding the rest.
pub async fn generate_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ImageData>>, ApiError> {
    let value: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Image request body not decodable, using defaults");
        Value::Null
    });
    let body = ImageGenerationBody::from_value(&value);

    let request = ImageGenerationRequest::from(body);

    tracing::info!(
        n = request.n,
        size = %request.size,
        response_format = %request.response_format,
        "Processing image generation request"
    );

    let images = state
        .upstream
        .generate_image(request)
        .await
        .map_err(|e| upstream_error(e, TRANSPORT_ERROR))?;

    if images.data.is_empty() {
        return Err(ApiError::UpstreamEmpty(NO_IMAGES.to_string()));
    }

    Ok(Json(images.data))
}
