//! The find-landmark and chat workflows.

use crate::capability::ImageInput;
use crate::lifecycle::ModelStatus;
use crate::payload::{ChatRequest, ChatResponse, LandmarkResult};
use crate::services::{DescriptionService, LandmarkService};
use std::path::{Path, PathBuf};

/// Turns photos and chat messages into response payloads.
///
/// Never waits for a model to load. When the vision model is not ready the
/// caller gets a message asking them to retry, and a load attempt is started
/// in the background if none is running.
#[derive(Debug, Clone)]
pub struct LandmarkFinder {
    landmarks: LandmarkService,
    descriptions: Option<DescriptionService>,
    media_root: PathBuf,
}

impl LandmarkFinder {
    /// Creates a finder. Without a description service, results carry no
    /// description.
    #[must_use]
    pub fn new(
        landmarks: LandmarkService,
        descriptions: Option<DescriptionService>,
        media_root: PathBuf,
    ) -> Self {
        Self {
            landmarks,
            descriptions,
            media_root,
        }
    }

    /// Identifies the landmark in `image` and describes it.
    ///
    /// Must be called from within a tokio runtime, since a load attempt may
    /// be spawned.
    pub async fn find(&self, image: ImageInput) -> LandmarkResult {
        let vision = self.landmarks.manager();
        match vision.status().status {
            ModelStatus::Loading => {
                return LandmarkResult::failure(format!(
                    "{} model is still loading. Please try again in a moment.",
                    vision.name()
                ));
            }
            ModelStatus::NotInitialized | ModelStatus::Error => {
                tracing::info!(model = vision.name(), "Model not ready, starting a load attempt");
                drop(vision.spawn_initialize());
                return LandmarkResult::failure(format!(
                    "{} model is initializing. Please try again in a moment.",
                    vision.name()
                ));
            }
            ModelStatus::Ready => {}
        }

        let name = match self.landmarks.identify_landmark(image).await {
            Ok(name) => name,
            Err(err) => {
                tracing::error!(error = %err, "Error processing image");
                return LandmarkResult::failure(err.to_string());
            }
        };

        let description = self.describe(&name).await;
        LandmarkResult::found(name, description)
    }

    /// Reads the photo at `path` and runs [`find`](Self::find).
    pub async fn find_at(&self, path: &Path) -> LandmarkResult {
        match ImageInput::from_path(path).await {
            Ok(image) => self.find(image).await,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Could not read uploaded image");
                LandmarkResult::failure(err.to_string())
            }
        }
    }

    /// Answers a chat message about a landmark.
    pub async fn chat(&self, request: &ChatRequest) -> ChatResponse {
        let chat = match request.validate(&self.media_root) {
            Ok(chat) => chat,
            Err(err) => return ChatResponse::failure(err.to_string()),
        };

        let vision = self.landmarks.manager();
        if !vision.status().is_ready {
            return ChatResponse::failure(format!(
                "{} model is not ready. Please try again in a moment.",
                vision.name()
            ));
        }

        ChatResponse::from_result(
            self.landmarks
                .chat_with_landmark_context(
                    &chat.message,
                    &chat.landmark_name,
                    chat.image_path.as_deref(),
                )
                .await,
        )
    }

    async fn describe(&self, landmark_name: &str) -> Option<String> {
        let descriptions = self.descriptions.as_ref()?;
        let text = descriptions.manager();
        if !text.status().is_ready {
            tracing::info!(model = text.name(), "Skipping description, model not ready");
            return None;
        }

        match descriptions.generate_landmark_description(landmark_name).await {
            Ok(description) => Some(description),
            Err(err) => {
                tracing::warn!(landmark = landmark_name, error = %err, "Failed to generate description");
                None
            }
        }
    }
}
