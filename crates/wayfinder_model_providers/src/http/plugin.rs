//! Inference server provider plugin.

use super::client::InferenceClient;
use super::provider::{HttpTextLoader, HttpVisionLoader};
use wayfinder_models::{ModelLoaders, ModelsConfig, ModelsPlugin};
use wayfinder_system::plugin::{Plugin, PluginId, Version};
use wayfinder_system::server::Server;

/// Environment variable holding an optional bearer token.
const TOKEN_ENV: &str = "WAYFINDER_INFERENCE_TOKEN";

/// Plugin registering inference server backends for both models.
///
/// Model identifiers come from the [`ModelsConfig`] published by
/// [`ModelsPlugin`].
///
/// ```no_run
/// # use wayfinder_model_providers::http::HttpProvidersPlugin;
/// # use wayfinder_models::ModelsPlugin;
/// # use wayfinder_system::server::Server;
/// let mut server = Server::new();
/// server.add_plugins(ModelsPlugin::default());
/// server.add_plugins(HttpProvidersPlugin::from_env("WAYFINDER_INFERENCE_URL"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpProvidersPlugin {
    client: InferenceClient,
    describe: bool,
}

impl HttpProvidersPlugin {
    /// Creates a plugin for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(InferenceClient::new(base_url))
    }

    /// Creates a plugin using a configured client.
    #[must_use]
    pub fn with_client(client: InferenceClient) -> Self {
        Self {
            client,
            describe: true,
        }
    }

    /// Creates a plugin that reads the server URL from the specified
    /// environment variable, and a bearer token from
    /// `WAYFINDER_INFERENCE_TOKEN` if set.
    ///
    /// # Panics
    ///
    /// Panics if the environment variable is not set.
    #[must_use]
    pub fn from_env(env_var: &str) -> Self {
        let base_url = std::env::var(env_var).unwrap_or_else(|_| {
            panic!("Environment variable {env_var} for HttpProvidersPlugin not set. Please set it to the inference server URL.");
        });
        let mut client = InferenceClient::new(base_url);
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            client = client.with_token(token);
        }
        Self::with_client(client)
    }

    /// Registers only the vision backend, disabling descriptions.
    #[must_use]
    pub fn without_descriptions(mut self) -> Self {
        self.describe = false;
        self
    }
}

impl Plugin for HttpProvidersPlugin {
    const ID: &'static str = "wayfinder::provider::http";
    const VERSION: Version = Version::new(0, 0, 1);

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ModelsPlugin>()]
    }

    fn build(&self, server: &mut Server) {
        let Some(config) = server.get_global::<ModelsConfig>() else {
            panic!("ModelsConfig not found. Make sure to add ModelsPlugin before HttpProvidersPlugin.");
        };
        let Some(loaders) = server.get_resource_mut::<ModelLoaders>() else {
            panic!("ModelLoaders not found. Make sure to add ModelsPlugin before HttpProvidersPlugin.");
        };

        tracing::info!(
            base_url = self.client.base_url(),
            vision = %config.vision_model,
            text = %config.text_model,
            "Registering inference server backends"
        );
        loaders.register_vision_loader(HttpVisionLoader::new(
            self.client.clone(),
            config.vision_model.clone(),
        ));
        if self.describe {
            loaders.register_text_loader(HttpTextLoader::new(
                self.client.clone(),
                config.text_model.clone(),
            ));
        }
    }
}
