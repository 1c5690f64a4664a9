//! Loader registration and the shared model set.

use crate::capability::{TextModel, VisionModel};
use crate::config::ModelsConfig;
use crate::finder::LandmarkFinder;
use crate::lifecycle::{MissingLoader, ModelLoader, StatusSnapshot};
use crate::services::{DescriptionService, LandmarkService, TextManager, VisionManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wayfinder_system::resource::GlobalResource;

/// Display name of the landmark identification model.
pub const VISION_MODEL_NAME: &str = "VQA";

/// Display name of the description model.
pub const TEXT_MODEL_NAME: &str = "GPT-2";

/// Shared loader for the landmark identification model.
pub type SharedVisionLoader = Arc<dyn ModelLoader<Model = dyn VisionModel>>;

/// Shared loader for the description model.
pub type SharedTextLoader = Arc<dyn ModelLoader<Model = dyn TextModel>>;

/// Build-time registry that provider plugins fill during `build()`.
///
/// Consumed by [`ModelsPlugin`](crate::ModelsPlugin) in its `ready()` phase.
#[derive(Default)]
pub struct ModelLoaders {
    vision: Option<SharedVisionLoader>,
    text: Option<SharedTextLoader>,
}

impl core::fmt::Debug for ModelLoaders {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelLoaders")
            .field("vision", &self.vision.is_some())
            .field("text", &self.text.is_some())
            .finish()
    }
}

impl ModelLoaders {
    /// Registers the landmark identification backend.
    ///
    /// # Panics
    ///
    /// Panics if a vision loader was already registered.
    pub fn register_vision_loader(&mut self, loader: impl ModelLoader<Model = dyn VisionModel>) {
        self.register_vision_shared(Arc::new(loader));
    }

    /// Registers an already shared landmark identification backend.
    ///
    /// # Panics
    ///
    /// Panics if a vision loader was already registered.
    pub fn register_vision_shared(&mut self, loader: SharedVisionLoader) {
        assert!(
            self.vision.is_none(),
            "A vision model loader is already registered."
        );
        self.vision = Some(loader);
    }

    /// Registers the description backend.
    ///
    /// # Panics
    ///
    /// Panics if a text loader was already registered.
    pub fn register_text_loader(&mut self, loader: impl ModelLoader<Model = dyn TextModel>) {
        self.register_text_shared(Arc::new(loader));
    }

    /// Registers an already shared description backend.
    ///
    /// # Panics
    ///
    /// Panics if a text loader was already registered.
    pub fn register_text_shared(&mut self, loader: SharedTextLoader) {
        assert!(
            self.text.is_none(),
            "A text model loader is already registered."
        );
        self.text = Some(loader);
    }

    /// Returns true if a vision loader is registered.
    #[must_use]
    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }

    /// Returns true if a text loader is registered.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_tracked_per_kind() {
        let mut loaders = ModelLoaders::default();
        assert!(!loaders.has_vision() && !loaders.has_text());

        loaders.register_text_loader(MissingLoader::<dyn TextModel>::new("text"));
        assert!(loaders.has_text());
        assert!(!loaders.has_vision());
    }

    #[test]
    fn missing_text_loader_disables_descriptions() {
        let mut loaders = ModelLoaders::default();
        loaders.register_vision_loader(MissingLoader::<dyn VisionModel>::new("vision"));

        let models = GuideModels::from_loaders(ModelsConfig::default(), loaders);
        assert!(models.descriptions().is_none());
        assert!(models.status().text.is_none());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn second_text_loader_panics() {
        let mut loaders = ModelLoaders::default();
        loaders.register_text_loader(MissingLoader::<dyn TextModel>::new("text"));
        loaders.register_text_loader(MissingLoader::<dyn TextModel>::new("text"));
    }
}

/// Status of both models, shaped like the status endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsStatus {
    /// Landmark identification model.
    pub vision: StatusSnapshot,
    /// Description model, absent when none is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<StatusSnapshot>,
}

/// The process-wide model set, stored as a server global.
///
/// Holds one manager per model and the services built on them. Handlers get
/// it with `server.get_global::<GuideModels>()`.
#[derive(Debug)]
pub struct GuideModels {
    config: ModelsConfig,
    landmarks: LandmarkService,
    descriptions: Option<DescriptionService>,
}

impl GlobalResource for GuideModels {}

impl GuideModels {
    /// Wraps existing managers. The text manager is optional.
    #[must_use]
    pub fn new(
        config: ModelsConfig,
        vision: Arc<VisionManager>,
        text: Option<Arc<TextManager>>,
    ) -> Self {
        let landmarks = LandmarkService::new(
            vision,
            config.landmark_question.clone(),
            config.vision_temperature,
        );
        let descriptions = text.map(|text| {
            DescriptionService::new(
                text,
                config.description_max_length,
                config.text_temperature,
                config.description_retry(),
            )
        });
        Self {
            config,
            landmarks,
            descriptions,
        }
    }

    /// Creates managers from registered loaders.
    ///
    /// A missing vision loader yields a manager whose load attempts always
    /// fail. A missing text loader leaves descriptions disabled.
    #[must_use]
    pub fn from_loaders(config: ModelsConfig, loaders: ModelLoaders) -> Self {
        let vision_loader = loaders
            .vision
            .unwrap_or_else(|| Arc::new(MissingLoader::<dyn VisionModel>::new("vision")));
        let vision = Arc::new(VisionManager::from_shared(VISION_MODEL_NAME, vision_loader));
        let text = loaders
            .text
            .map(|loader| Arc::new(TextManager::from_shared(TEXT_MODEL_NAME, loader)));
        Self::new(config, vision, text)
    }

    /// Returns the configuration the services were built with.
    #[must_use]
    pub fn config(&self) -> &ModelsConfig {
        &self.config
    }

    /// Returns the landmark service.
    #[must_use]
    pub fn landmarks(&self) -> &LandmarkService {
        &self.landmarks
    }

    /// Returns the description service, if a text model is configured.
    #[must_use]
    pub fn descriptions(&self) -> Option<&DescriptionService> {
        self.descriptions.as_ref()
    }

    /// Returns the vision manager.
    #[must_use]
    pub fn vision(&self) -> &Arc<VisionManager> {
        self.landmarks.manager()
    }

    /// Returns the text manager, if configured.
    #[must_use]
    pub fn text(&self) -> Option<&Arc<TextManager>> {
        self.descriptions.as_ref().map(DescriptionService::manager)
    }

    /// Returns the status of both models.
    #[must_use]
    pub fn status(&self) -> ModelsStatus {
        ModelsStatus {
            vision: self.vision().status(),
            text: self.text().map(|text| text.status()),
        }
    }

    /// Returns a finder over these models.
    #[must_use]
    pub fn finder(&self) -> LandmarkFinder {
        LandmarkFinder::new(
            self.landmarks.clone(),
            self.descriptions.clone(),
            self.config.media_root.clone(),
        )
    }
}
