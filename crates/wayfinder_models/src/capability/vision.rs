//! Visual question answering capability.

use crate::error::InferenceError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Question asked when identifying a landmark from a photo.
pub const LANDMARK_QUESTION: &str = "What is the name of the landmark in the image?";

/// Trait implemented by visual question answering backends.
#[async_trait]
pub trait VisionModel: Send + Sync + 'static {
    /// Answers the conversation about the given image.
    async fn chat(&self, request: VisionRequest) -> Result<String, InferenceError>;
}

/// Supported image formats.
#[expect(missing_docs, reason = "variants are self-explanatory format names")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMediaType {
    /// Guesses the format from a file extension, defaulting to JPEG.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("png") => Self::Png,
            Some("gif") => Self::Gif,
            Some("webp") => Self::Webp,
            _ => Self::Jpeg,
        }
    }

    /// Returns the MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Image passed to a [`VisionModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Encoded image bytes.
    Encoded {
        /// Raw file contents.
        data: Vec<u8>,
        /// Format of `data`.
        media_type: ImageMediaType,
    },
    /// A blank white image of the given size. Used for text-only chat, since
    /// vision models still require an image.
    Blank {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

impl ImageInput {
    /// Creates an image from encoded bytes.
    #[must_use]
    pub fn encoded(data: impl Into<Vec<u8>>, media_type: ImageMediaType) -> Self {
        Self::Encoded {
            data: data.into(),
            media_type,
        }
    }

    /// Returns the 1x1 placeholder used when no image is available.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self::Blank {
            width: 1,
            height: 1,
        }
    }

    /// Reads an image file.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Image`] if the file cannot be read or is empty.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|err| InferenceError::Image(format!("{}: {err}", path.display())))?;
        if data.is_empty() {
            return Err(InferenceError::Image(format!(
                "{}: file is empty",
                path.display()
            )));
        }
        Ok(Self::encoded(data, ImageMediaType::from_path(path)))
    }

    /// Returns true for the blank placeholder.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank { .. })
    }

    /// Returns the encoded bytes as standard base64, or `None` for blank images.
    #[must_use]
    pub fn to_base64(&self) -> Option<String> {
        match self {
            Self::Encoded { data, .. } => Some(STANDARD.encode(data)),
            Self::Blank { .. } => None,
        }
    }
}

/// Speaker of a chat message.
#[expect(missing_docs, reason = "variants are self-explanatory roles")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A request to a [`VisionModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    /// The image under discussion.
    pub image: ImageInput,
    /// Conversation, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Whether to sample instead of decoding greedily.
    pub sampling: bool,
    /// Sampling temperature.
    pub temperature: f32,
}

impl VisionRequest {
    /// Creates a single-question request with sampling at temperature 0.7.
    ///
    /// ```
    /// use wayfinder_models::capability::{ImageInput, VisionRequest, LANDMARK_QUESTION};
    ///
    /// let request = VisionRequest::question(ImageInput::placeholder(), LANDMARK_QUESTION);
    /// assert_eq!(request.messages.len(), 1);
    /// assert!(request.sampling);
    /// ```
    #[must_use]
    pub fn question(image: ImageInput, question: impl Into<String>) -> Self {
        Self {
            image,
            messages: vec![ChatMessage::user(question)],
            sampling: true,
            temperature: 0.7,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the text of the most recent user message.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
    }
}
