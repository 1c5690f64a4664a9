//! Capabilities provided by loaded models.
//!
//! Backends implement [`VisionModel`] (landmark identification and chat) and
//! [`TextModel`] (landmark descriptions). Both are used only through a
//! [`ModelLifecycleManager`](crate::lifecycle::ModelLifecycleManager).

mod text;
mod vision;

pub use text::{TextModel, TextRequest};
pub use vision::{
    ChatMessage, ImageInput, ImageMediaType, LANDMARK_QUESTION, Role, VisionModel, VisionRequest,
};
