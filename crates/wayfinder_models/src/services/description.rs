//! Landmark descriptions from the text model.

use super::TextManager;
use crate::capability::TextRequest;
use crate::error::{InferenceError, LifecycleError};
use crate::postprocess::{RetryPolicy, strip_prompt};
use std::sync::Arc;

/// Generates short descriptions of landmarks.
#[derive(Debug, Clone)]
pub struct DescriptionService {
    text: Arc<TextManager>,
    max_length: usize,
    temperature: f32,
    retry: RetryPolicy,
}

impl DescriptionService {
    /// Creates a service over `text`.
    ///
    /// # Arguments
    ///
    /// * `max_length` - Length budget of the first attempt
    /// * `retry` - When to regenerate a description that is too short
    #[must_use]
    pub fn new(
        text: Arc<TextManager>,
        max_length: usize,
        temperature: f32,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            text,
            max_length,
            temperature,
            retry,
        }
    }

    /// Returns the underlying manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<TextManager> {
        &self.text
    }

    /// Describes the significance and history of a landmark.
    ///
    /// The echoed prompt is removed from the output. A description shorter
    /// than the policy minimum is regenerated with a larger budget, at most
    /// `max_retries` times, and the last result is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the model is not ready, the call fails,
    /// or no sequence was generated.
    pub async fn generate_landmark_description(
        &self,
        landmark_name: &str,
    ) -> Result<String, LifecycleError> {
        let prompt = description_prompt(landmark_name);
        let mut budget = self.max_length;
        let mut retries = 0;

        loop {
            let description = self.generate_once(&prompt, budget).await?;
            match self.retry.next_budget(&description, budget, retries) {
                Some(next) => {
                    tracing::debug!(
                        landmark = landmark_name,
                        chars = description.chars().count(),
                        next_budget = next,
                        "Description too short, regenerating"
                    );
                    budget = next;
                    retries += 1;
                }
                None => return Ok(description),
            }
        }
    }

    async fn generate_once(&self, prompt: &str, max_length: usize) -> Result<String, LifecycleError> {
        let request = TextRequest::new(prompt)
            .with_max_length(max_length)
            .with_temperature(self.temperature);
        let sequences = self
            .text
            .invoke(|model| async move { model.generate(request).await })
            .await?;

        let Some(first) = sequences.into_iter().next() else {
            return Err(self.text.inference_failure(InferenceError::EmptyOutput));
        };
        Ok(strip_prompt(&first, prompt))
    }
}

/// Builds the description prompt for a landmark.
#[must_use]
pub fn description_prompt(landmark_name: &str) -> String {
    format!("Write a brief description of the significance and history of {landmark_name}:")
}
