//! Landmark guide CLI.
//!
//! Identifies landmarks in photos and answers questions about them, using an
//! inference server for both models.
//!
//! # Usage
//!
//! ```bash
//! guide find <image_path>
//! guide chat <landmark_name> <message> [image_path]
//! guide status
//! ```
//!
//! # Example
//!
//! ```bash
//! WAYFINDER_INFERENCE_URL=http://localhost:8000 guide find ./photos/tower.jpg
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use wayfinder_core_plugins::TracingPlugin;
use wayfinder_model_providers::HttpProvidersPlugin;
use wayfinder_models::payload::ChatRequest;
use wayfinder_models::startup::{LoaderHandle, load_models};
use wayfinder_models::{GuideModels, ModelsPlugin};
use wayfinder_system::plugin::{PluginGroup, PluginGroupBuilder};
use wayfinder_system::server::Server;

/// Environment variable holding the inference server URL.
const INFERENCE_URL_ENV: &str = "WAYFINDER_INFERENCE_URL";

/// Logging, the model set and its inference server backend.
struct GuidePlugins {
    models: ModelsPlugin,
}

impl PluginGroup for GuidePlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(TracingPlugin::from_env())
            .add(self.models)
            .add(HttpProvidersPlugin::from_env(INFERENCE_URL_ENV))
    }
}

enum Command {
    Find(PathBuf),
    Chat(ChatRequest),
    Status,
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args {
        [command, path] if command == "find" => Some(Command::Find(PathBuf::from(path))),
        [command, landmark, message, rest @ ..] if command == "chat" && rest.len() <= 1 => {
            Some(Command::Chat(ChatRequest {
                message: message.clone(),
                landmark_name: landmark.clone(),
                image_path: rest.first().cloned(),
            }))
        }
        [command] if command == "status" => Some(Command::Status),
        _ => None,
    }
}

#[tokio::main]
#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "CLI output and usage errors"
)]
async fn main() {
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("Usage: guide find <image_path>");
        eprintln!("       guide chat <landmark_name> <message> [image_path]");
        eprintln!("       guide status");
        std::process::exit(1);
    };

    let models = ModelsPlugin::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if std::env::var(INFERENCE_URL_ENV).is_err() {
        eprintln!("Error: {INFERENCE_URL_ENV} is not set");
        std::process::exit(1);
    }

    // Initialize server with plugins
    let mut server = Server::new();
    server.add_plugins(GuidePlugins { models }.build());
    server.finish();

    let Some(models) = server.get_global::<GuideModels>() else {
        eprintln!("Error: models were not registered");
        std::process::exit(1);
    };

    // A one-shot CLI waits for the startup load instead of asking to retry.
    wait_for_models(&server, &models).await;

    let output = match command {
        Command::Find(path) => serde_json::to_string_pretty(&models.finder().find_at(&path).await),
        Command::Chat(request) => serde_json::to_string_pretty(&models.finder().chat(&request).await),
        Command::Status => serde_json::to_string_pretty(&models.status()),
    };

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e}"),
    }

    server.cleanup();
}

async fn wait_for_models(server: &Server, models: &Arc<GuideModels>) {
    let task = server
        .get_global::<LoaderHandle>()
        .and_then(|handle| handle.take());

    let report = match task {
        Some(task) => match task.await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "Model loader task failed");
                return;
            }
        },
        None => load_models(models).await,
    };
    tracing::debug!(?report, "Models loaded");
}
