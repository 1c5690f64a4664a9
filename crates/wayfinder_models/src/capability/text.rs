//! Text generation capability.

use crate::error::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait implemented by text generation backends.
#[async_trait]
pub trait TextModel: Send + Sync + 'static {
    /// Generates `request.num_return_sequences` continuations of the prompt.
    ///
    /// Backends may echo the prompt at the start of each sequence.
    async fn generate(&self, request: TextRequest) -> Result<Vec<String>, InferenceError>;
}

/// A text generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    /// Prompt to continue.
    pub prompt: String,
    /// Length budget, in tokens, including the prompt.
    pub max_length: usize,
    /// Number of sequences to return.
    pub num_return_sequences: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Whether to sample instead of decoding greedily.
    pub do_sample: bool,
}

impl TextRequest {
    /// Creates a request with a 150-token budget, one sequence and sampling
    /// at temperature 0.8.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_length: 150,
            num_return_sequences: 1,
            temperature: 0.8,
            do_sample: true,
        }
    }

    /// Sets the length budget.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
