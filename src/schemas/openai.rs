//! OpenAI API schema definitions
//!
//! Three groups of types live here:
//! - client request bodies, where every optional field may be omitted,
//! - upstream request payloads, with every default already applied,
//! - upstream responses, decoded leniently so that a provider error body
//!   turns into an empty result instead of a decode failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TOP_P: f32 = 1.0;
pub const DEFAULT_MAX_TOKENS: i64 = 1000;

pub const DEFAULT_IMAGE_PROMPT: &str = "something random";
pub const DEFAULT_IMAGE_COUNT: u32 = 1;
pub const DEFAULT_IMAGE_RESPONSE_FORMAT: &str = "url";
/// Sizes the image endpoint accepts, smallest first
pub const IMAGE_SIZES: [&str; 3] = ["256x256", "512x512", "1024x1024"];

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Treats JSON `null` like an absent string
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Empty strings count as "not supplied"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ============================================================================
// Chat
// ============================================================================

/// A single chat message, passed through verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "nullable_string")]
    pub role: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body accepted by `POST /chatCompletion`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ChatCompletionBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "Error: At least one message is required"))]
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<i64>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

/// Chat completion payload sent upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

impl From<ChatCompletionBody> for ChatCompletionRequest {
    fn from(body: ChatCompletionBody) -> Self {
        Self {
            messages: body.messages,
            model: non_empty(body.model).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            temperature: body.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: body.top_p.unwrap_or(DEFAULT_TOP_P),
            max_tokens: body.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            frequency_penalty: body.frequency_penalty,
            presence_penalty: body.presence_penalty,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// Message of the first choice, if the provider returned any
    pub fn into_first_message(self) -> Option<ChatMessage> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }
}

// ============================================================================
// Images
// ============================================================================

/// Body accepted by `POST /generateImage`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationBody {
    pub prompt: Option<String>,
    pub n: Option<u32>,
    pub size: Option<String>,
    pub response_format: Option<String>,
    pub user: Option<String>,
}

/// Image generation payload sent upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub response_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ImageGenerationBody {
    /// Read each field on its own from an already parsed body
    ///
    /// A field with the wrong JSON type is treated as absent while the other
    /// fields are kept. Anything other than an object yields all defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let string = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            prompt: string("prompt"),
            n: object
                .get("n")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
            size: string("size"),
            response_format: string("response_format"),
            user: string("user"),
        }
    }
}

impl From<ImageGenerationBody> for ImageGenerationRequest {
    fn from(body: ImageGenerationBody) -> Self {
        // Unknown sizes fall back to the smallest supported one
        let size = body
            .size
            .filter(|size| IMAGE_SIZES.contains(&size.as_str()))
            .unwrap_or_else(|| IMAGE_SIZES[0].to_string());

        Self {
            prompt: non_empty(body.prompt).unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string()),
            n: body.n.filter(|n| *n > 0).unwrap_or(DEFAULT_IMAGE_COUNT),
            size,
            response_format: non_empty(body.response_format)
                .unwrap_or_else(|| DEFAULT_IMAGE_RESPONSE_FORMAT.to_string()),
            user: non_empty(body.user),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

// ============================================================================
// Embeddings
// ============================================================================

/// Body accepted by `POST /createEmbedding`
///
/// `input` stays untyped until validation so that a bare string or a
/// non-string element produces the input error rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingBody {
    pub model: Option<String>,
    pub input: Option<Value>,
    pub user: Option<String>,
}

impl EmbeddingBody {
    /// Validated input strings
    ///
    /// Rejects anything but an array of strings, an empty array, and an
    /// array holding a single empty string.
    pub fn input_strings(&self) -> Option<Vec<String>> {
        let items = self.input.as_ref()?.as_array()?;
        let strings = items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;

        match strings.as_slice() {
            [] => None,
            [only] if only.is_empty() => None,
            _ => Some(strings),
        }
    }

    /// Build the upstream payload, or `None` when the input is invalid
    pub fn into_request(self) -> Option<EmbeddingRequest> {
        let input = self.input_strings()?;
        Some(EmbeddingRequest {
            model: non_empty(self.model).unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            input,
            user: non_empty(self.user),
        })
    }
}

/// Embedding payload sent upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub embedding: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: Option<EmbeddingUsage>,
}

// ============================================================================
// Text extraction
// ============================================================================

/// Body accepted by `POST /getTextFromURL`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TextFromUrlBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "Must pass a valid url"))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
}

// ============================================================================
// Tests
// ============================================================================
