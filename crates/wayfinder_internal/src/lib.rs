//! # Wayfinder Internal Library
//!
//! Re-exports the core Wayfinder crates for convenience.

/// Plugin and resource runtime.
pub use wayfinder_system;

/// Model lifecycle management and landmark services.
pub use wayfinder_models;

/// Model backends.
pub use wayfinder_model_providers;

/// Infrastructure plugins such as tracing.
pub use wayfinder_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use wayfinder_core_plugins::{TracingConfig, TracingFormat, TracingPlugin};
    #[cfg(feature = "http")]
    pub use wayfinder_model_providers::HttpProvidersPlugin;
    pub use wayfinder_models::capability::{ImageInput, TextModel, VisionModel};
    pub use wayfinder_models::error::{InferenceError, LifecycleError, LoadError};
    pub use wayfinder_models::lifecycle::{
        ModelLifecycleManager, ModelLoader, ModelStatus, StatusSnapshot,
    };
    pub use wayfinder_models::payload::{ChatRequest, ChatResponse, LandmarkResult};
    pub use wayfinder_models::{GuideModels, LandmarkFinder, ModelLoaders, ModelsConfig, ModelsPlugin};
    pub use wayfinder_system::prelude::*;
}
