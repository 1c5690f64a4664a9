//! Landmark services built on the model managers.

mod description;
mod landmark;

use crate::capability::{TextModel, VisionModel};
use crate::lifecycle::ModelLifecycleManager;

pub use description::{DescriptionService, description_prompt};
pub use landmark::{LandmarkService, context_question};

/// Manager for the landmark identification model.
pub type VisionManager = ModelLifecycleManager<dyn VisionModel>;

/// Manager for the description model.
pub type TextManager = ModelLifecycleManager<dyn TextModel>;
