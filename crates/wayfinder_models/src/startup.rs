//! Background model loading at process startup.

use crate::lifecycle::ModelStatus;
use crate::registry::GuideModels;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use wayfinder_system::resource::GlobalResource;

/// Status of each model after the startup load finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Landmark identification model.
    pub vision: ModelStatus,
    /// Description model, if configured.
    pub text: Option<ModelStatus>,
}

/// Loads the vision model, then the text model.
///
/// Failures are logged and recorded in the managers; they are never
/// returned. A model that is already loading or loaded is left alone.
pub async fn load_models(models: &GuideModels) -> LoadReport {
    tracing::info!("Starting model loading");

    if let Err(err) = models.vision().initialize().await {
        tracing::error!(error = %err, "Vision model failed to load at startup");
    }

    if let Some(text) = models.text()
        && let Err(err) = text.initialize().await
    {
        tracing::error!(error = %err, "Text model failed to load at startup");
    }

    let report = LoadReport {
        vision: models.vision().status().status,
        text: models.text().map(|text| text.status().status),
    };
    tracing::info!(vision = %report.vision, text = ?report.text, "Model loading finished");
    report
}

/// Runs [`load_models`] on a spawned task.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_model_loader(models: Arc<GuideModels>) -> JoinHandle<LoadReport> {
    tokio::spawn(
        async move { load_models(&models).await }.instrument(tracing::info_span!("model_loader")),
    )
}

/// Handle to the startup load task, stored as a server global.
///
/// Awaiting it is optional. The task runs to completion either way.
#[derive(Debug, Default)]
pub struct LoaderHandle {
    task: Mutex<Option<JoinHandle<LoadReport>>>,
}

impl GlobalResource for LoaderHandle {}

impl LoaderHandle {
    /// Wraps a running load task.
    #[must_use]
    pub fn new(task: JoinHandle<LoadReport>) -> Self {
        Self {
            task: Mutex::new(Some(task)),
        }
    }

    /// Takes the task handle. Returns `None` if it was already taken.
    #[must_use]
    pub fn take(&self) -> Option<JoinHandle<LoadReport>> {
        self.task.lock().take()
    }
}
