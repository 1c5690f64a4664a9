//! Landmark identification and landmark-scoped chat.

use super::VisionManager;
use crate::capability::{ImageInput, VisionRequest};
use crate::error::LifecycleError;
use crate::postprocess::clean_text;
use std::path::Path;
use std::sync::Arc;

/// Asks the vision model about landmarks.
#[derive(Debug, Clone)]
pub struct LandmarkService {
    vision: Arc<VisionManager>,
    question: String,
    temperature: f32,
}

impl LandmarkService {
    /// Creates a service over `vision`.
    #[must_use]
    pub fn new(vision: Arc<VisionManager>, question: impl Into<String>, temperature: f32) -> Self {
        Self {
            vision,
            question: question.into(),
            temperature,
        }
    }

    /// Returns the underlying manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<VisionManager> {
        &self.vision
    }

    /// Identifies the landmark shown in `image` and returns its trimmed name.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the model is not ready or the call fails.
    pub async fn identify_landmark(&self, image: ImageInput) -> Result<String, LifecycleError> {
        let request =
            VisionRequest::question(image, self.question.clone()).with_temperature(self.temperature);
        let answer = self
            .vision
            .invoke(|model| async move { model.chat(request).await })
            .await?;
        tracing::debug!(raw = %answer, "Landmark identification answer");
        Ok(clean_text(&answer))
    }

    /// Reads the image at `path` and identifies it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InferenceFailure`] if the file cannot be read,
    /// otherwise the same errors as [`identify_landmark`](Self::identify_landmark).
    pub async fn identify_landmark_at(&self, path: &Path) -> Result<String, LifecycleError> {
        let image = ImageInput::from_path(path)
            .await
            .map_err(|err| self.vision.inference_failure(err))?;
        self.identify_landmark(image).await
    }

    /// Answers a question about a landmark.
    ///
    /// The image at `image_path` is used when it can be read. Otherwise the
    /// question is asked against a blank placeholder image.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the model is not ready or the call fails.
    pub async fn chat_with_landmark_context(
        &self,
        message: &str,
        landmark_name: &str,
        image_path: Option<&Path>,
    ) -> Result<String, LifecycleError> {
        let image = match image_path {
            Some(path) => match ImageInput::from_path(path).await {
                Ok(image) => image,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Could not load chat image, using placeholder");
                    ImageInput::placeholder()
                }
            },
            None => ImageInput::placeholder(),
        };

        let request = VisionRequest::question(image, context_question(landmark_name, message))
            .with_temperature(self.temperature);
        let answer = self
            .vision
            .invoke(|model| async move { model.chat(request).await })
            .await?;
        Ok(clean_text(&answer))
    }
}

/// Frames a chat message with the landmark it is about.
///
/// ```
/// assert_eq!(
///     wayfinder_models::services::context_question("Big Ben", "How tall is it?"),
///     "About Big Ben: How tall is it?"
/// );
/// ```
#[must_use]
pub fn context_question(landmark_name: &str, message: &str) -> String {
    format!("About {landmark_name}: {message}")
}
