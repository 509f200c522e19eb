//! Upstream provider client
//!
//! Sends chat, image and embedding payloads to an OpenAI-compatible REST API
//! with a static bearer token. One attempt per call: no retries, no backoff.

use crate::config::Settings;
use crate::schemas::openai::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    ImageGenerationRequest, ImageGenerationResponse,
};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const IMAGE_GENERATIONS_PATH: &str = "/images/generations";
const EMBEDDINGS_PATH: &str = "/embeddings";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when calling the upstream provider
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Failed to serialize request: {0}")]
    Serialization(serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Payloads
// ============================================================================

/// The closed set of payloads the relay sends upstream
///
/// Each variant is bound to exactly one provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    Chat(ChatCompletionRequest),
    Image(ImageGenerationRequest),
    Embedding(EmbeddingRequest),
}

impl UpstreamRequest {
    /// Endpoint path relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            UpstreamRequest::Chat(_) => CHAT_COMPLETIONS_PATH,
            UpstreamRequest::Image(_) => IMAGE_GENERATIONS_PATH,
            UpstreamRequest::Embedding(_) => EMBEDDINGS_PATH,
        }
    }

    /// Short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamRequest::Chat(_) => "chat",
            UpstreamRequest::Image(_) => "image",
            UpstreamRequest::Embedding(_) => "embedding",
        }
    }

    fn to_json(&self) -> Result<Vec<u8>, UpstreamError> {
        let body = match self {
            UpstreamRequest::Chat(request) => serde_json::to_vec(request),
            UpstreamRequest::Image(request) => serde_json::to_vec(request),
            UpstreamRequest::Embedding(request) => serde_json::to_vec(request),
        };
        body.map_err(UpstreamError::Serialization)
    }
}

impl From<ChatCompletionRequest> for UpstreamRequest {
    fn from(request: ChatCompletionRequest) -> Self {
        UpstreamRequest::Chat(request)
    }
}

impl From<ImageGenerationRequest> for UpstreamRequest {
    fn from(request: ImageGenerationRequest) -> Self {
        UpstreamRequest::Image(request)
    }
}

impl From<EmbeddingRequest> for UpstreamRequest {
    fn from(request: EmbeddingRequest) -> Self {
        UpstreamRequest::Embedding(request)
    }
}

// ============================================================================
// Upstream Client
// ============================================================================

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Bearer token sent with every request
    pub api_key: String,

    /// Base URL (default: api.openai.com/v1)
    pub base_url: Option<String>,

    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&Settings> for UpstreamConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key: settings.openai_api_key.clone(),
            base_url: Some(settings.openai_base_url.clone()),
            timeout: settings.upstream_timeout(),
        }
    }
}

/// Client for the upstream provider
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| OPENAI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        tracing::info!(
            base_url = %base_url,
            timeout_secs = ?config.timeout.map(|t| t.as_secs()),
            "Initialized upstream client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Full URL a payload is posted to
    pub fn endpoint_url(&self, request: &UpstreamRequest) -> String {
        format!("{}{}", self.base_url, request.endpoint())
    }

    /// POST a payload and hand back the raw response
    ///
    /// Non-2xx statuses are not errors here; the caller decodes whatever
    /// the provider returned.
    pub async fn send(&self, request: &UpstreamRequest) -> Result<reqwest::Response, UpstreamError> {
        let body = request.to_json()?;
        let url = self.endpoint_url(request);

        tracing::debug!(
            kind = request.kind(),
            url = %url,
            body_bytes = body.len(),
            "Calling upstream API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(kind = request.kind(), error = %e, "Upstream request failed");
                UpstreamError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                kind = request.kind(),
                status = status.as_u16(),
                "Upstream returned a non-success status"
            );
        }

        Ok(response)
    }

    /// Read a response body and parse it as `T`
    pub async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, UpstreamError> {
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, body_bytes = text.len(), "Failed to parse upstream response");
            UpstreamError::Decode(e.to_string())
        })
    }

    /// Request a chat completion
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        let response = self.send(&request.into()).await?;
        let completion: ChatCompletionResponse = Self::decode(response).await?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                model = %completion.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Chat completion usage"
            );
        }

        Ok(completion)
    }

    /// Request image generation
    pub async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, UpstreamError> {
        let response = self.send(&request.into()).await?;
        Self::decode(response).await
    }

    /// Request embeddings
    pub async fn create_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, UpstreamError> {
        let response = self.send(&request.into()).await?;
        let embeddings: EmbeddingResponse = Self::decode(response).await?;

        if let Some(usage) = &embeddings.usage {
            tracing::debug!(
                model = %embeddings.model,
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "Embedding usage"
            );
        }

        Ok(embeddings)
    }
}

// ============================================================================
// Tests
// ============================================================================
