//! Wire types of the inference server.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | `GET /health` | | [`HealthResponse`] |
//! | `POST /v1/vision/chat` | [`VisionChatRequest`] | [`VisionChatResponse`] |
//! | `POST /v1/generate` | [`GenerateRequest`] | [`GenerateResponse`] |

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Reply of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when the server accepts requests.
    pub status: String,
    /// Identifiers of the models the server has loaded.
    #[serde(default)]
    pub models: Vec<String>,
}

impl HealthResponse {
    /// Returns true if the server is up and serves `model`.
    #[must_use]
    pub fn serves(&self, model: &str) -> bool {
        self.status.eq_ignore_ascii_case("ok") && self.models.iter().any(|m| m == model)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vision
// ─────────────────────────────────────────────────────────────────────────────

/// Image attached to a vision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImagePayload {
    /// Encoded image bytes.
    Base64 {
        /// MIME type, e.g. `image/jpeg`.
        media_type: String,
        /// Standard base64 of the file contents.
        data: String,
    },
    /// A blank white image the server should synthesize.
    Blank {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParam {
    /// `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Request body for `/v1/vision/chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionChatRequest {
    /// Model identifier.
    pub model: String,
    /// Image under discussion.
    pub image: ImagePayload,
    /// Conversation, oldest first.
    pub messages: Vec<MessageParam>,
    /// Whether to sample.
    pub sampling: bool,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Response body of `/v1/vision/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VisionChatResponse {
    /// The model's answer, untrimmed.
    pub answer: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Text generation
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `/v1/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Model identifier.
    pub model: String,
    /// Prompt to continue.
    pub prompt: String,
    /// Length budget in tokens, prompt included.
    pub max_length: usize,
    /// Number of sequences to return.
    pub num_return_sequences: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Whether to sample.
    pub do_sample: bool,
}

/// One generated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedSequence {
    /// Generated text, which may start with the prompt.
    pub generated_text: String,
}

/// Response body of `/v1/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    /// Generated sequences.
    #[serde(default)]
    pub sequences: Vec<GeneratedSequence>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Error message.
    pub error: String,
}
