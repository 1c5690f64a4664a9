//! The [`ModelLifecycleManager`] status machine.

use super::loader::ModelLoader;
use super::status::{ModelStatus, StatusSnapshot};
use crate::error::{InferenceError, LifecycleError};
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Recorded when a load attempt ends without reporting a result.
const ABANDONED_DETAIL: &str = "load attempt was abandoned before completing";

/// Internal state. The capability exists only in `Ready` and the failure
/// detail only in `Error`.
enum LoadState<M: ?Sized> {
    NotInitialized,
    Loading,
    Ready(Arc<M>),
    Error(String),
}

impl<M: ?Sized> LoadState<M> {
    fn status(&self) -> ModelStatus {
        match self {
            Self::NotInitialized => ModelStatus::NotInitialized,
            Self::Loading => ModelStatus::Loading,
            Self::Ready(_) => ModelStatus::Ready,
            Self::Error(_) => ModelStatus::Error,
        }
    }
}

/// Result of a successful call to [`ModelLifecycleManager::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// This call ran a load attempt and the model is now ready.
    Loaded,
    /// Another attempt was already in flight; nothing was started.
    AlreadyLoading,
    /// The model was already loaded; nothing was started.
    AlreadyReady,
}

/// Owns one lazily constructed model capability and gates access to it.
///
/// The manager is created by the composition root and shared by `Arc`.
/// Construction runs through [`initialize`](Self::initialize), normally from a
/// background task; request handlers only call [`status`](Self::status) and
/// [`invoke`](Self::invoke).
///
/// ```
/// # use std::sync::Arc;
/// # use async_trait::async_trait;
/// # use wayfinder_models::error::LoadError;
/// # use wayfinder_models::lifecycle::{ModelLifecycleManager, ModelLoader, ModelStatus};
/// struct Echo;
/// struct EchoLoader;
///
/// #[async_trait]
/// impl ModelLoader for EchoLoader {
///     type Model = Echo;
///     async fn load(&self) -> Result<Arc<Echo>, LoadError> {
///         Ok(Arc::new(Echo))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let manager = ModelLifecycleManager::new("echo", EchoLoader);
/// assert_eq!(manager.status().status, ModelStatus::NotInitialized);
///
/// manager.initialize().await.unwrap();
/// let answer = manager
///     .invoke(|_echo| async { Ok::<_, wayfinder_models::error::InferenceError>("  hi  ") })
///     .await
///     .unwrap();
/// assert_eq!(answer, "  hi  ");
/// # });
/// ```
pub struct ModelLifecycleManager<M: ?Sized + Send + Sync + 'static> {
    name: String,
    loader: Arc<dyn ModelLoader<Model = M>>,
    state: RwLock<LoadState<M>>,
    invocations: Option<Semaphore>,
    attempts: AtomicU64,
}

impl<M: ?Sized + Send + Sync + 'static> core::fmt::Debug for ModelLifecycleManager<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelLifecycleManager")
            .field("name", &self.name)
            .field("status", &self.state.read().status())
            .field("attempts", &self.load_attempts())
            .finish_non_exhaustive()
    }
}

impl<M: ?Sized + Send + Sync + 'static> ModelLifecycleManager<M> {
    /// Creates a manager in the `NotInitialized` state.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name used in messages and logs (e.g. `"VQA"`)
    /// * `loader` - Constructs the capability on each load attempt
    #[must_use]
    pub fn new(name: impl Into<String>, loader: impl ModelLoader<Model = M>) -> Self {
        Self::from_shared(name, Arc::new(loader))
    }

    /// Creates a manager from an already shared loader.
    #[must_use]
    pub fn from_shared(name: impl Into<String>, loader: Arc<dyn ModelLoader<Model = M>>) -> Self {
        let invocations = loader
            .max_concurrent_invocations()
            .map(|permits| Semaphore::new(permits.max(1)));
        Self {
            name: name.into(),
            loader,
            state: RwLock::new(LoadState::NotInitialized),
            invocations,
            attempts: AtomicU64::new(0),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of load attempts started so far.
    #[must_use]
    pub fn load_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Returns the current status. Never fails.
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        let state = self.state.read();
        let detail = match &*state {
            LoadState::Error(detail) => Some(detail.clone()),
            _ => None,
        };
        StatusSnapshot::new(state.status(), detail)
    }

    /// Runs a load attempt unless one is in flight or the model is loaded.
    ///
    /// The transition to `Loading` happens under the write lock, so racing
    /// callers cannot both start construction. The capability and the `Ready`
    /// status are published in a single write.
    ///
    /// If this future is dropped mid-attempt, or the loader panics, the
    /// attempt is recorded as failed so a later call can retry.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ConstructionFailure`] if the loader fails.
    /// The manager is left in the error state and may be initialized again.
    pub async fn initialize(&self) -> Result<InitOutcome, LifecycleError> {
        {
            let mut state = self.state.write();
            match &*state {
                LoadState::Loading => {
                    tracing::info!(model = %self.name, "Model is already loading");
                    return Ok(InitOutcome::AlreadyLoading);
                }
                LoadState::Ready(_) => return Ok(InitOutcome::AlreadyReady),
                LoadState::NotInitialized | LoadState::Error(_) => {
                    *state = LoadState::Loading;
                }
            }
        }

        let attempt = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(model = %self.name, attempt, "Initializing model");

        let guard = AttemptGuard {
            state: &self.state,
            model: &self.name,
            settled: false,
        };

        match self.loader.load().await {
            Ok(model) => {
                guard.settle(LoadState::Ready(model));
                tracing::info!(model = %self.name, attempt, "Model initialized successfully");
                Ok(InitOutcome::Loaded)
            }
            Err(err) => {
                let detail = err.to_string();
                guard.settle(LoadState::Error(detail.clone()));
                tracing::error!(model = %self.name, attempt, error = %detail, "Failed to initialize model");
                Err(LifecycleError::ConstructionFailure {
                    model: self.name.clone(),
                    detail,
                })
            }
        }
    }

    /// Starts [`initialize`](Self::initialize) on a spawned tokio task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<Result<InitOutcome, LifecycleError>> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.initialize().await })
    }

    /// Returns the loaded capability.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::ModelBusy`] while a load attempt is in flight
    /// - [`LifecycleError::ModelUnavailable`] if never initialized or the
    ///   last attempt failed (carrying the stored detail)
    pub fn capability(&self) -> Result<Arc<M>, LifecycleError> {
        match &*self.state.read() {
            LoadState::Ready(model) => Ok(Arc::clone(model)),
            LoadState::Loading => Err(LifecycleError::ModelBusy {
                model: self.name.clone(),
            }),
            LoadState::Error(detail) => Err(LifecycleError::ModelUnavailable {
                model: self.name.clone(),
                detail: Some(detail.clone()),
            }),
            LoadState::NotInitialized => Err(LifecycleError::ModelUnavailable {
                model: self.name.clone(),
                detail: None,
            }),
        }
    }

    /// Runs an inference call against the loaded capability.
    ///
    /// The call receives a shared handle to the capability and returns its
    /// raw result; callers apply their own post-processing. When the loader
    /// declared a concurrency limit, the call waits for a free slot first.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`capability`](Self::capability). A failing call
    /// is reported as [`LifecycleError::InferenceFailure`] and does not change
    /// the manager's status.
    pub async fn invoke<T, F, Fut>(&self, call: F) -> Result<T, LifecycleError>
    where
        F: FnOnce(Arc<M>) -> Fut,
        Fut: Future<Output = Result<T, InferenceError>>,
    {
        let model = self.capability()?;

        let _permit = match &self.invocations {
            Some(gate) => Some(gate.acquire().await.map_err(|_| {
                LifecycleError::ModelUnavailable {
                    model: self.name.clone(),
                    detail: Some("invocation gate closed".to_string()),
                }
            })?),
            None => None,
        };

        call(model).await.map_err(|source| self.inference_failure(source))
    }

    /// Wraps a per-call failure with this manager's name.
    #[must_use]
    pub fn inference_failure(&self, source: InferenceError) -> LifecycleError {
        tracing::warn!(model = %self.name, error = %source, "Inference call failed");
        LifecycleError::InferenceFailure {
            model: self.name.clone(),
            source,
        }
    }
}

/// Settles an in-flight load attempt, recording an error if it is dropped
/// without a result.
struct AttemptGuard<'a, M: ?Sized> {
    state: &'a RwLock<LoadState<M>>,
    model: &'a str,
    settled: bool,
}

impl<M: ?Sized> AttemptGuard<'_, M> {
    fn settle(mut self, next: LoadState<M>) {
        *self.state.write() = next;
        self.settled = true;
    }
}

impl<M: ?Sized> Drop for AttemptGuard<'_, M> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(model = %self.model, "Model load attempt abandoned");
            *self.state.write() = LoadState::Error(ABANDONED_DETAIL.to_string());
        }
    }
}
