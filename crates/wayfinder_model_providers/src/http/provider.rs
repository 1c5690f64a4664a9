//! Loaders and capabilities backed by the inference server.

use super::client::InferenceClient;
use super::types::{
    GenerateRequest, HealthResponse, ImagePayload, MessageParam, VisionChatRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use wayfinder_models::capability::{
    ImageInput, Role, TextModel, TextRequest, VisionModel, VisionRequest,
};
use wayfinder_models::error::{InferenceError, LoadError};
use wayfinder_models::lifecycle::ModelLoader;

/// Checks that the server reported by `health` serves `model`.
fn ensure_served(health: &HealthResponse, model: &str) -> Result<(), LoadError> {
    if health.serves(model) {
        return Ok(());
    }
    if !health.status.eq_ignore_ascii_case("ok") {
        return Err(LoadError::failed(format!(
            "inference server is not ready (status: {})",
            health.status
        )));
    }
    Err(LoadError::NotFound(format!(
        "{model} is not served (available: {})",
        health.models.join(", ")
    )))
}

async fn probe(client: &InferenceClient, model: &str) -> Result<(), LoadError> {
    tracing::debug!(base_url = client.base_url(), model, "Probing inference server");
    let health = client.health().await?;
    ensure_served(&health, model)
}

// ─────────────────────────────────────────────────────────────────────────────
// Vision
// ─────────────────────────────────────────────────────────────────────────────

/// Loads a [`VisionModel`] served by the inference server.
#[derive(Debug, Clone)]
pub struct HttpVisionLoader {
    client: InferenceClient,
    model: String,
}

impl HttpVisionLoader {
    /// Creates a loader for `model`.
    #[must_use]
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelLoader for HttpVisionLoader {
    type Model = dyn VisionModel;

    async fn load(&self) -> Result<Arc<dyn VisionModel>, LoadError> {
        probe(&self.client, &self.model).await?;
        Ok(Arc::new(HttpVisionModel {
            client: self.client.clone(),
            model: self.model.clone(),
        }))
    }

    fn max_concurrent_invocations(&self) -> Option<usize> {
        None
    }
}

/// [`VisionModel`] calling `/v1/vision/chat`.
#[derive(Debug, Clone)]
pub struct HttpVisionModel {
    client: InferenceClient,
    model: String,
}

#[async_trait]
impl VisionModel for HttpVisionModel {
    async fn chat(&self, request: VisionRequest) -> Result<String, InferenceError> {
        let body = convert_vision_request(&self.model, request);
        let response = self.client.vision_chat(&body).await?;
        Ok(response.answer)
    }
}

fn convert_vision_request(model: &str, request: VisionRequest) -> VisionChatRequest {
    let image = match &request.image {
        ImageInput::Encoded { media_type, .. } => ImagePayload::Base64 {
            media_type: media_type.mime().to_string(),
            data: request.image.to_base64().unwrap_or_default(),
        },
        ImageInput::Blank { width, height } => ImagePayload::Blank {
            width: *width,
            height: *height,
        },
    };

    VisionChatRequest {
        model: model.to_string(),
        image,
        messages: request
            .messages
            .into_iter()
            .map(|message| MessageParam {
                role: match message.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                }
                .to_string(),
                content: message.content,
            })
            .collect(),
        sampling: request.sampling,
        temperature: request.temperature,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

/// Loads a [`TextModel`] served by the inference server.
#[derive(Debug, Clone)]
pub struct HttpTextLoader {
    client: InferenceClient,
    model: String,
}

impl HttpTextLoader {
    /// Creates a loader for `model`.
    #[must_use]
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelLoader for HttpTextLoader {
    type Model = dyn TextModel;

    async fn load(&self) -> Result<Arc<dyn TextModel>, LoadError> {
        probe(&self.client, &self.model).await?;
        Ok(Arc::new(HttpTextModel {
            client: self.client.clone(),
            model: self.model.clone(),
        }))
    }

    fn max_concurrent_invocations(&self) -> Option<usize> {
        None
    }
}

/// [`TextModel`] calling `/v1/generate`.
#[derive(Debug, Clone)]
pub struct HttpTextModel {
    client: InferenceClient,
    model: String,
}

#[async_trait]
impl TextModel for HttpTextModel {
    async fn generate(&self, request: TextRequest) -> Result<Vec<String>, InferenceError> {
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt,
            max_length: request.max_length,
            num_return_sequences: request.num_return_sequences,
            temperature: request.temperature,
            do_sample: request.do_sample,
        };
        let response = self.client.generate(&body).await?;
        Ok(response
            .sequences
            .into_iter()
            .map(|sequence| sequence.generated_text)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wayfinder_models::capability::{ImageMediaType, LANDMARK_QUESTION};

    fn health(status: &str, models: &[&str]) -> HealthResponse {
        HealthResponse {
            status: status.to_string(),
            models: models.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn served_model_passes_probe() {
        assert!(ensure_served(&health("ok", &["gpt2", "openbmb/MiniCPM-V-2"]), "gpt2").is_ok());
    }

    #[test]
    fn unserved_model_is_not_found() {
        let err = ensure_served(&health("ok", &["gpt2"]), "openbmb/MiniCPM-V-2").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert!(err.to_string().contains("available: gpt2"));
    }

    #[test]
    fn starting_server_fails_attempt() {
        let err = ensure_served(&health("loading", &[]), "gpt2").unwrap_err();
        assert_eq!(err.to_string(), "inference server is not ready (status: loading)");
    }

    #[test]
    fn encoded_image_is_sent_as_base64() {
        let image = ImageInput::encoded(b"abc".to_vec(), ImageMediaType::Png);
        let body = convert_vision_request("vqa", VisionRequest::question(image, LANDMARK_QUESTION));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["image"],
            json!({"type": "base64", "media_type": "image/png", "data": "YWJj"})
        );
        assert_eq!(
            json["messages"],
            json!([{"role": "user", "content": LANDMARK_QUESTION}])
        );
        assert_eq!(json["sampling"], true);
    }

    #[test]
    fn placeholder_image_is_sent_as_blank() {
        let body = convert_vision_request(
            "vqa",
            VisionRequest::question(ImageInput::placeholder(), "About Petra: Hi"),
        );
        assert_eq!(body.image, ImagePayload::Blank { width: 1, height: 1 });
    }
}
