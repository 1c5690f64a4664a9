//! Model lifecycle management and landmark services for Wayfinder.
//!
//! Loads the landmark identification and description models in the
//! background and gates access to them while they load.
//!
//! # Overview
//!
//! - Lazy construction: each model is owned by a
//!   [`ModelLifecycleManager`](lifecycle::ModelLifecycleManager) that tracks
//!   `NotInitialized → Loading → Ready | Error` and never blocks callers on a load.
//!
//! - Backend-agnostic: backends implement [`ModelLoader`](lifecycle::ModelLoader)
//!   plus a capability trait from [`capability`], and register through
//!   [`ModelLoaders`] during server build.
//!
//! - No global singleton: [`ModelsPlugin`] publishes a [`GuideModels`] global on
//!   the [`Server`](wayfinder_system::server::Server).
//!
//! # Example
//!
//! ```ignore
//! use wayfinder_models::{GuideModels, ModelsPlugin};
//!
//! let models = server.get_global::<GuideModels>().unwrap();
//! let result = models.finder().find_at(Path::new("uploads/tower.jpg")).await;
//! println!("{}", serde_json::to_string(&result)?);
//! ```

pub mod capability;
pub mod config;
pub mod error;
mod finder;
pub mod lifecycle;
pub mod payload;
mod plugin;
pub mod postprocess;
mod registry;
pub mod services;
pub mod startup;

pub use config::ModelsConfig;
pub use finder::LandmarkFinder;
pub use plugin::ModelsPlugin;
pub use registry::{
    GuideModels, ModelLoaders, ModelsStatus, SharedTextLoader, SharedVisionLoader,
    TEXT_MODEL_NAME, VISION_MODEL_NAME,
};
