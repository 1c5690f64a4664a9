//! Lazy construction and guarded access for expensive model capabilities.
//!
//! A [`ModelLifecycleManager`] tracks one capability through
//! `NotInitialized → Loading → Ready | Error`. Load attempts are started with
//! [`ModelLifecycleManager::initialize`]; concurrent calls while loading are
//! rejected rather than queued, and a failed attempt may be retried.

mod loader;
mod manager;
mod status;

pub use loader::{MissingLoader, ModelLoader};
pub use manager::{InitOutcome, ModelLifecycleManager};
pub use status::{ModelStatus, StatusSnapshot};
