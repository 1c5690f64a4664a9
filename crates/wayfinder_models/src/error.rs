//! Error types for model lifecycle and inference.

/// Error constructing a model capability.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Construction failed; the message is the raw failure detail.
    #[error("{0}")]
    Failed(String),

    /// The requested model (weights, checkpoint or remote deployment) was not found.
    #[error("model not found: {0}")]
    NotFound(String),

    /// Transport error while reaching a remote model backend.
    #[error("http error: {0}")]
    Http(String),

    /// The loader is missing or misconfigured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LoadError {
    /// Creates a [`LoadError::Failed`] from any message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Error raised by a single inference call.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("http error: {0}")]
    Http(String),

    /// The request could not be built or was rejected as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The model backend returned something that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The input image could not be read or decoded.
    #[error("image error: {0}")]
    Image(String),

    /// The model produced no output.
    #[error("No text was generated")]
    EmptyOutput,

    /// Error returned by the model backend.
    #[error("provider error: {message}")]
    Provider {
        /// HTTP status code if available.
        status: Option<u16>,
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Error surfaced by a [`ModelLifecycleManager`](crate::lifecycle::ModelLifecycleManager).
///
/// Every variant names the model it concerns, and its `Display` output is the
/// user-facing message returned by the JSON endpoints.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A load attempt failed. The manager is now in the error state and
    /// `initialize()` may be called again.
    #[error("{model} model failed to load: {detail}")]
    ConstructionFailure {
        /// Model display name.
        model: String,
        /// Failure detail captured from the loader.
        detail: String,
    },

    /// A load attempt is in progress. Retry after a delay.
    #[error("{model} model is still loading. Please try again in a moment.")]
    ModelBusy {
        /// Model display name.
        model: String,
    },

    /// The model was never initialized, or its last load attempt failed.
    #[error("{}", unavailable_message(.model, .detail.as_deref()))]
    ModelUnavailable {
        /// Model display name.
        model: String,
        /// Stored failure detail of the last attempt, if any.
        detail: Option<String>,
    },

    /// A single inference call failed. The manager's status is unchanged.
    #[error("{model} inference failed: {source}")]
    InferenceFailure {
        /// Model display name.
        model: String,
        /// The failure reported by the capability.
        #[source]
        source: InferenceError,
    },
}

fn unavailable_message(model: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{model} model failed to load: {detail}"),
        None => format!("{model} model is not initialized"),
    }
}

impl LifecycleError {
    /// Returns the failure detail carried by this error, if any.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::ConstructionFailure { detail, .. } => Some(detail.clone()),
            Self::ModelUnavailable { detail, .. } => detail.clone(),
            Self::InferenceFailure { source, .. } => Some(source.to_string()),
            Self::ModelBusy { .. } => None,
        }
    }

    /// Returns the display name of the model this error concerns.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::ConstructionFailure { model, .. }
            | Self::ModelBusy { model }
            | Self::ModelUnavailable { model, .. }
            | Self::InferenceFailure { model, .. } => model,
        }
    }

    /// Returns true if the model is loading and the call should be retried later.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::ModelBusy { .. })
    }
}

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Values are individually valid but inconsistent with each other.
    #[error("invalid configuration: {0}")]
    Inconsistent(String),
}
