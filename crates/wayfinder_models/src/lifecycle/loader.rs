//! The [`ModelLoader`] trait for constructing model capabilities.

use crate::error::LoadError;
use async_trait::async_trait;
use core::marker::PhantomData;
use std::sync::Arc;

/// Constructs a model capability.
///
/// Loading is slow (downloading weights, moving tensors to a device, probing a
/// remote deployment) and is driven by a
/// [`ModelLifecycleManager`](super::ModelLifecycleManager), normally from a
/// background task started at process startup.
#[async_trait]
pub trait ModelLoader: Send + Sync + 'static {
    /// The capability produced by a successful load, usually a trait object
    /// such as `dyn VisionModel`.
    type Model: ?Sized + Send + Sync + 'static;

    /// Runs one construction attempt.
    async fn load(&self) -> Result<Arc<Self::Model>, LoadError>;

    /// How many invocations the loaded capability accepts at once.
    ///
    /// `Some(1)` (the default) serializes calls, which is required for
    /// in-process models that are not safe to call from several threads.
    /// `None` removes the limit, for backends that queue requests themselves.
    fn max_concurrent_invocations(&self) -> Option<usize> {
        Some(1)
    }
}

/// Loader used when no backend was registered for a model kind.
///
/// Every attempt fails, leaving the manager in the error state with a
/// message explaining what is missing.
pub struct MissingLoader<M: ?Sized> {
    kind: &'static str,
    _model: PhantomData<fn() -> Box<M>>,
}

impl<M: ?Sized> MissingLoader<M> {
    /// Creates a loader reporting that no `kind` backend is registered.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            _model: PhantomData,
        }
    }
}

impl<M: ?Sized> core::fmt::Debug for MissingLoader<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MissingLoader")
            .field("kind", &self.kind)
            .finish()
    }
}

#[async_trait]
impl<M: ?Sized + Send + Sync + 'static> ModelLoader for MissingLoader<M> {
    type Model = M;

    async fn load(&self) -> Result<Arc<M>, LoadError> {
        Err(LoadError::InvalidConfig(format!(
            "no {} model backend is registered",
            self.kind
        )))
    }
}
