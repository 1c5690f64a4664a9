//! JSON payloads exchanged with the web layer.

use crate::error::LifecycleError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// URL prefix under which uploaded images are served.
const MEDIA_URL_PREFIX: &str = "/media/";

/// Outcome of a landmark lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkResult {
    /// Whether a landmark was identified.
    pub success: bool,
    /// Identified landmark name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Generated description, when the text model was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User-facing failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LandmarkResult {
    /// A successful identification.
    #[must_use]
    pub fn found(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            success: true,
            name: Some(name.into()),
            description,
            error: None,
        }
    }

    /// A failed lookup with a user-facing message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            name: None,
            description: None,
            error: Some(error.into()),
        }
    }
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Whether the model answered.
    pub success: bool,
    /// The answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// User-facing failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// A successful answer.
    #[must_use]
    pub fn answered(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
        }
    }

    /// A failed chat with a user-facing message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }

    /// Converts a service result into a response.
    #[must_use]
    pub fn from_result(result: Result<String, LifecycleError>) -> Self {
        match result {
            Ok(answer) => Self::answered(answer),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Error validating a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatRequestError {
    /// The message or landmark name was blank.
    #[error("Message and landmark name are required")]
    MissingFields,

    /// A media URL pointed outside the media root.
    #[error("Invalid image path: {0}")]
    InvalidImagePath(String),
}

/// A chat message about a previously identified landmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    #[serde(default)]
    pub message: String,
    /// Landmark the question is about.
    #[serde(default)]
    pub landmark_name: String,
    /// Path or media URL of the landmark photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// A [`ChatRequest`] with trimmed fields and a resolved image path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChat {
    /// The user's question.
    pub message: String,
    /// Landmark the question is about.
    pub landmark_name: String,
    /// Filesystem path of the landmark photo.
    pub image_path: Option<PathBuf>,
}

impl ChatRequest {
    /// Trims the fields and resolves `image_path`.
    ///
    /// Paths starting with `/media/` are mapped under `media_root`; other
    /// paths are used as given.
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use wayfinder_models::payload::ChatRequest;
    ///
    /// let request = ChatRequest {
    ///     message: " When was it built? ".into(),
    ///     landmark_name: "Eiffel Tower".into(),
    ///     image_path: Some("/media/uploads/tower.jpg".into()),
    /// };
    /// let chat = request.validate(Path::new("/srv/media")).unwrap();
    /// assert_eq!(chat.message, "When was it built?");
    /// assert_eq!(chat.image_path, Some(PathBuf::from("/srv/media/uploads/tower.jpg")));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ChatRequestError::MissingFields`] if the message or the
    /// landmark name is blank, and [`ChatRequestError::InvalidImagePath`] if a
    /// media URL contains `..` or an absolute path.
    pub fn validate(&self, media_root: &Path) -> Result<ValidatedChat, ChatRequestError> {
        let message = self.message.trim();
        let landmark_name = self.landmark_name.trim();
        if message.is_empty() || landmark_name.is_empty() {
            return Err(ChatRequestError::MissingFields);
        }

        let image_path = self
            .image_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| resolve_image_path(path, media_root))
            .transpose()?;

        Ok(ValidatedChat {
            message: message.to_string(),
            landmark_name: landmark_name.to_string(),
            image_path,
        })
    }
}

fn resolve_image_path(path: &str, media_root: &Path) -> Result<PathBuf, ChatRequestError> {
    let Some(relative) = path.strip_prefix(MEDIA_URL_PREFIX) else {
        return Ok(PathBuf::from(path));
    };
    let relative = Path::new(relative);
    let contained = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if !contained {
        return Err(ChatRequestError::InvalidImagePath(path.to_string()));
    }
    Ok(media_root.join(relative))
}
