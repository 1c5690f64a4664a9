//! Model configuration.

use crate::error::ConfigError;
use crate::postprocess::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use wayfinder_system::resource::GlobalResource;

/// Settings shared by the model managers and services.
///
/// Built with [`Default`] plus the `with_*` methods, deserialized from a file,
/// or read from `WAYFINDER_*` environment variables with
/// [`from_env`](Self::from_env).
///
/// [`ModelsPlugin`](crate::ModelsPlugin) publishes it as a server global so
/// provider plugins can read the model identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Identifier of the landmark identification model.
    pub vision_model: String,
    /// Identifier of the description model.
    pub text_model: String,
    /// Question asked when identifying a landmark.
    pub landmark_question: String,
    /// Sampling temperature for identification and chat.
    pub vision_temperature: f32,
    /// Sampling temperature for descriptions.
    pub text_temperature: f32,
    /// Initial length budget for descriptions.
    pub description_max_length: usize,
    /// Descriptions shorter than this are regenerated with a larger budget.
    pub description_min_chars: usize,
    /// Budget increase per regeneration.
    pub description_length_step: usize,
    /// No regeneration once the budget reaches this value.
    pub description_length_cap: usize,
    /// Maximum number of regenerations.
    pub description_max_retries: usize,
    /// Start loading models in the background when the server is ready.
    pub autoload: bool,
    /// Directory that `/media/...` image URLs resolve into.
    pub media_root: PathBuf,
}

impl GlobalResource for ModelsConfig {}

impl Default for ModelsConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            vision_model: "openbmb/MiniCPM-V-2".to_string(),
            text_model: "gpt2".to_string(),
            landmark_question: crate::capability::LANDMARK_QUESTION.to_string(),
            vision_temperature: 0.7,
            text_temperature: 0.8,
            description_max_length: 150,
            description_min_chars: retry.min_chars,
            description_length_step: retry.length_step,
            description_length_cap: retry.length_cap,
            description_max_retries: retry.max_retries,
            autoload: true,
            media_root: PathBuf::from("media"),
        }
    }
}

impl ModelsConfig {
    /// Reads overrides from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `WAYFINDER_VISION_MODEL` | `vision_model` |
    /// | `WAYFINDER_TEXT_MODEL` | `text_model` |
    /// | `WAYFINDER_VISION_TEMPERATURE` | `vision_temperature` |
    /// | `WAYFINDER_TEXT_TEMPERATURE` | `text_temperature` |
    /// | `WAYFINDER_DESCRIPTION_MAX_LENGTH` | `description_max_length` |
    /// | `WAYFINDER_DESCRIPTION_MIN_CHARS` | `description_min_chars` |
    /// | `WAYFINDER_AUTOLOAD` | `autoload` |
    /// | `WAYFINDER_MEDIA_ROOT` | `media_root` |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    ///
    /// ```
    /// use wayfinder_models::ModelsConfig;
    ///
    /// let config = ModelsConfig::from_lookup(|key| {
    ///     (key == "WAYFINDER_TEXT_MODEL").then(|| "distilgpt2".to_string())
    /// })
    /// .unwrap();
    /// assert_eq!(config.text_model, "distilgpt2");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(model) = value("WAYFINDER_VISION_MODEL") {
            config.vision_model = model;
        }
        if let Some(model) = value("WAYFINDER_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(raw) = value("WAYFINDER_VISION_TEMPERATURE") {
            config.vision_temperature = parse("WAYFINDER_VISION_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = value("WAYFINDER_TEXT_TEMPERATURE") {
            config.text_temperature = parse("WAYFINDER_TEXT_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = value("WAYFINDER_DESCRIPTION_MAX_LENGTH") {
            config.description_max_length = parse("WAYFINDER_DESCRIPTION_MAX_LENGTH", &raw)?;
        }
        if let Some(raw) = value("WAYFINDER_DESCRIPTION_MIN_CHARS") {
            config.description_min_chars = parse("WAYFINDER_DESCRIPTION_MIN_CHARS", &raw)?;
        }
        if let Some(raw) = value("WAYFINDER_AUTOLOAD") {
            config.autoload = parse_flag("WAYFINDER_AUTOLOAD", &raw)?;
        }
        if let Some(root) = value("WAYFINDER_MEDIA_ROOT") {
            config.media_root = PathBuf::from(root);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that values are consistent with each other.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Inconsistent`] for a zero length budget or a
    /// temperature that is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.description_max_length == 0 {
            return Err(ConfigError::Inconsistent(
                "description_max_length must be greater than zero".to_string(),
            ));
        }
        let usable = |temperature: f32| temperature.is_finite() && temperature >= 0.0;
        if !usable(self.vision_temperature) || !usable(self.text_temperature) {
            return Err(ConfigError::Inconsistent(
                "temperatures must be finite and not negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the landmark identification model.
    #[must_use]
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Sets the description model.
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Enables or disables background loading at startup.
    #[must_use]
    pub fn with_autoload(mut self, autoload: bool) -> Self {
        self.autoload = autoload;
        self
    }

    /// Sets the media root for chat image paths.
    #[must_use]
    pub fn with_media_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.media_root = root.into();
        self
    }

    /// Sets the description length policy.
    #[must_use]
    pub fn with_description_lengths(mut self, max_length: usize, min_chars: usize) -> Self {
        self.description_max_length = max_length;
        self.description_min_chars = min_chars;
        self
    }

    /// Returns the regeneration policy for descriptions.
    #[must_use]
    pub fn description_retry(&self) -> RetryPolicy {
        RetryPolicy {
            min_chars: self.description_min_chars,
            length_step: self.description_length_step,
            length_cap: self.description_length_cap,
            max_retries: self.description_max_retries,
        }
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
