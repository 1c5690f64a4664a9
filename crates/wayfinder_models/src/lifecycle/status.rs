//! Status reporting for model managers.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Position of a model in its load lifecycle.
///
/// `NotInitialized → Loading → Ready | Error`, with `Error → Loading` on retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// No load attempt has been started.
    #[default]
    NotInitialized,
    /// A load attempt is in flight.
    Loading,
    /// The capability is loaded and accepts calls.
    Ready,
    /// The last load attempt failed.
    Error,
}

impl ModelStatus {
    /// Returns the wire name (`"not_initialized"`, `"loading"`, `"ready"`, `"error"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a manager, shaped like the status endpoint payload.
///
/// ```
/// use wayfinder_models::lifecycle::{ModelStatus, StatusSnapshot};
///
/// let snapshot = StatusSnapshot::new(ModelStatus::Loading, None);
/// let json = serde_json::to_value(&snapshot).unwrap();
/// assert_eq!(json["status"], "loading");
/// assert_eq!(json["is_loading"], true);
/// assert!(json.get("error").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Current status.
    pub status: ModelStatus,
    /// Shorthand for `status == Ready`.
    pub is_ready: bool,
    /// Shorthand for `status == Loading`.
    pub is_loading: bool,
    /// Failure detail, present only in the error state.
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl StatusSnapshot {
    /// Builds a snapshot, dropping `error_detail` unless `status` is `Error`.
    #[must_use]
    pub fn new(status: ModelStatus, error_detail: Option<String>) -> Self {
        Self {
            status,
            is_ready: status == ModelStatus::Ready,
            is_loading: status == ModelStatus::Loading,
            error_detail: if status == ModelStatus::Error {
                error_detail
            } else {
                None
            },
        }
    }
}
