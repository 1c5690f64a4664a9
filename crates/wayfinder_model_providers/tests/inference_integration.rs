//! Integration tests against a running inference server.
//!
//! These tests are ignored by default because they require:
//! - `WAYFINDER_INFERENCE_URL` environment variable (or in `.env` file)
//! - A server hosting the configured vision and text models
//!
//! To run these tests:
//! ```sh
//! cargo test -p wayfinder_model_providers --test inference_integration -- --ignored
//! ```

mod common;

use common::{RED_SQUARE_PNG_BASE64, init_env};
use std::sync::Arc;
use wayfinder_model_providers::HttpProvidersPlugin;
use wayfinder_models::capability::{ImageInput, ImageMediaType};
use wayfinder_models::startup::load_models;
use wayfinder_models::{GuideModels, ModelsConfig, ModelsPlugin};
use wayfinder_system::server::Server;

async fn loaded_models() -> Arc<GuideModels> {
    init_env();

    let mut server = Server::new();
    server.add_plugins(ModelsPlugin::new(
        ModelsConfig::from_env()
            .expect("configuration should be valid")
            .with_autoload(false),
    ));
    server.add_plugins(HttpProvidersPlugin::from_env("WAYFINDER_INFERENCE_URL"));
    server.finish();

    let models = server
        .get_global::<GuideModels>()
        .expect("GuideModels should be available");
    load_models(&models).await;
    models
}

fn red_square() -> ImageInput {
    use base64::Engine as _;
    let data = base64::engine::general_purpose::STANDARD
        .decode(RED_SQUARE_PNG_BASE64)
        .expect("valid base64");
    ImageInput::encoded(data, ImageMediaType::Png)
}

#[tokio::test]
#[ignore = "requires WAYFINDER_INFERENCE_URL"]
async fn identifies_an_image() {
    let models = loaded_models().await;
    assert!(models.vision().status().is_ready);

    let answer = models
        .landmarks()
        .identify_landmark(red_square())
        .await
        .expect("identification should succeed");
    assert!(!answer.is_empty());
    assert_eq!(answer, answer.trim());
}

#[tokio::test]
#[ignore = "requires WAYFINDER_INFERENCE_URL"]
async fn chats_without_an_image() {
    let models = loaded_models().await;
    let answer = models
        .landmarks()
        .chat_with_landmark_context("Where is it?", "Eiffel Tower", None)
        .await
        .expect("chat should succeed");
    assert!(!answer.is_empty());
}

#[tokio::test]
#[ignore = "requires WAYFINDER_INFERENCE_URL"]
async fn describes_a_landmark() {
    let models = loaded_models().await;
    let descriptions = models.descriptions().expect("text model configured");
    let description = descriptions
        .generate_landmark_description("Eiffel Tower")
        .await
        .expect("description should succeed");
    assert!(!description.starts_with("Write a brief description"));
}
