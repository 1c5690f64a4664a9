//! Inference server client.

use super::types::{
    ErrorBody, GenerateRequest, GenerateResponse, HealthResponse, VisionChatRequest,
    VisionChatResponse,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wayfinder_models::error::{InferenceError, LoadError};

/// HTTP client for a JSON inference server.
#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl InferenceClient {
    /// Creates a client for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client using a preconfigured [`reqwest::Client`], e.g. one
    /// with a request timeout.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `token` as a bearer token on every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queries the health endpoint.
    pub async fn health(&self) -> Result<HealthResponse, LoadError> {
        let url = format!("{}/health", self.base_url);
        let headers = self
            .headers()
            .map_err(|err| LoadError::InvalidConfig(err.to_string()))?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|err| LoadError::Http(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| LoadError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(LoadError::Http(format!(
                "health check returned {status}: {}",
                error_message(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|err| LoadError::Http(format!("invalid health response: {err}")))
    }

    /// Sends a vision chat request.
    pub async fn vision_chat(
        &self,
        request: &VisionChatRequest,
    ) -> Result<VisionChatResponse, InferenceError> {
        self.post("/v1/vision/chat", request).await
    }

    /// Sends a text generation request.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, InferenceError> {
        self.post("/v1/generate", request).await
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, InferenceError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let headers = self.headers()?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|err| InferenceError::Http(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| InferenceError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(InferenceError::Provider {
                status: Some(status.as_u16()),
                message: error_message(&body),
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|err| {
            InferenceError::InvalidResponse(format!(
                "Failed to parse response: {err}\nBody: {body}"
            ))
        })
    }

    fn headers(&self) -> Result<HeaderMap, InferenceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
                InferenceError::InvalidRequest(format!("Invalid token header: {err}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

/// Extracts the `error` field of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| body.to_string())
}

impl core::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
