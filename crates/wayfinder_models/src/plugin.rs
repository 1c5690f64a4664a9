//! Server integration for the model set.

use crate::config::ModelsConfig;
use crate::error::ConfigError;
use crate::registry::{GuideModels, ModelLoaders};
use crate::startup::{LoaderHandle, spawn_model_loader};
use std::sync::Arc;
use wayfinder_system::plugin::{Plugin, Version};
use wayfinder_system::server::Server;

/// Builds the [`GuideModels`] global from loaders registered by provider
/// plugins.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`ModelsConfig`] | Global | Configuration, readable by providers in `build()` |
/// | [`ModelLoaders`] | Build-time | Registry filled by providers in `build()` |
/// | [`GuideModels`] | Global | Managers and services for both models |
/// | [`LoaderHandle`] | Global | Startup load task, when autoload is on |
///
/// # Example
///
/// ```
/// use wayfinder_models::{GuideModels, ModelsConfig, ModelsPlugin};
/// use wayfinder_system::server::Server;
///
/// let mut server = Server::new();
/// server.add_plugins(ModelsPlugin::new(ModelsConfig::default().with_autoload(false)));
/// server.finish();
///
/// let models = server.get_global::<GuideModels>().unwrap();
/// assert!(!models.vision().status().is_ready);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelsPlugin {
    config: ModelsConfig,
}

impl ModelsPlugin {
    /// Creates the plugin with the given configuration.
    #[must_use]
    pub fn new(config: ModelsConfig) -> Self {
        Self { config }
    }

    /// Creates the plugin from `WAYFINDER_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        ModelsConfig::from_env().map(Self::new)
    }

    /// Enables or disables background loading when the server is ready.
    #[must_use]
    pub fn with_autoload(mut self, autoload: bool) -> Self {
        self.config.autoload = autoload;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ModelsConfig {
        &self.config
    }
}

impl Plugin for ModelsPlugin {
    const ID: &'static str = "wayfinder::models";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, server: &mut Server) {
        server.insert_global(self.config.clone());
        server.insert_resource(ModelLoaders::default());
    }

    fn ready(&self, server: &mut Server) {
        let loaders = server.remove_resource::<ModelLoaders>().unwrap_or_default();
        if !loaders.has_vision() {
            tracing::warn!("No vision model backend registered, landmark lookups will fail");
        }
        if !loaders.has_text() {
            tracing::info!("No text model backend registered, descriptions are disabled");
        }

        let models = Arc::new(GuideModels::from_loaders(self.config.clone(), loaders));
        server.insert_global_arc(Arc::clone(&models));

        if !self.config.autoload {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("No tokio runtime available, models will load on first request");
            return;
        }
        server.insert_global(LoaderHandle::new(spawn_model_loader(models)));
    }
}
