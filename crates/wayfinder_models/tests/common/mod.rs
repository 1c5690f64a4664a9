//! Stub loaders and capabilities shared by the integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test helpers, not all items used in every test binary"
)]

use async_trait::async_trait;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wayfinder_models::capability::{TextModel, TextRequest, VisionModel, VisionRequest};
use wayfinder_models::error::{InferenceError, LoadError};
use wayfinder_models::lifecycle::ModelLoader;

/// Vision stub answering every request with a fixed reply.
pub struct StubVision {
    reply: Result<String, String>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<VisionRequest>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl StubVision {
    pub fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self::new(Ok(reply.to_string()), None))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::new(Err(message.to_string()), None))
    }

    /// Answers after `delay`, so overlapping calls can be observed.
    pub fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(Ok(reply.to_string()), Some(delay)))
    }

    fn new(reply: Result<String, String>, delay: Option<Duration>) -> Self {
        Self {
            reply,
            delay,
            requests: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> VisionRequest {
        self.requests.lock().last().cloned().unwrap()
    }
}

#[async_trait]
impl VisionModel for StubVision {
    async fn chat(&self, request: VisionRequest) -> Result<String, InferenceError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.reply.clone().map_err(InferenceError::InvalidResponse)
    }
}

/// Text stub returning queued generations in order.
pub struct StubText {
    replies: Mutex<VecDeque<Vec<String>>>,
    pub requests: Mutex<Vec<TextRequest>>,
}

impl StubText {
    pub fn replying(replies: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn max_lengths(&self) -> Vec<usize> {
        self.requests.lock().iter().map(|r| r.max_length).collect()
    }
}

#[async_trait]
impl TextModel for StubText {
    async fn generate(&self, request: TextRequest) -> Result<Vec<String>, InferenceError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| InferenceError::InvalidResponse("no reply queued".into()))
    }
}

/// Loader handing out queued outcomes, one per attempt.
///
/// With a gate, each attempt waits for [`Notify::notify_one`] before
/// completing.
pub struct StubLoader<M: ?Sized> {
    outcomes: Mutex<VecDeque<Result<Arc<M>, String>>>,
    gate: Option<Arc<Notify>>,
    limit: Option<usize>,
    pub attempts: AtomicUsize,
}

impl<M: ?Sized> StubLoader<M> {
    pub fn new(outcomes: Vec<Result<Arc<M>, String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            gate: None,
            limit: Some(1),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn ready(model: Arc<M>) -> Self {
        Self::new(vec![Ok(model)])
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn concurrency(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl<M: ?Sized + Send + Sync + 'static> ModelLoader for StubLoader<M> {
    type Model = M;

    async fn load(&self) -> Result<Arc<M>, LoadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no outcome queued".to_string()))
            .map_err(LoadError::failed)
    }

    fn max_concurrent_invocations(&self) -> Option<usize> {
        self.limit
    }
}

/// Loader yielding a vision stub.
pub fn vision_loader(model: Arc<StubVision>) -> StubLoader<dyn VisionModel> {
    StubLoader::ready(model as Arc<dyn VisionModel>)
}

/// Loader yielding a text stub.
pub fn text_loader(model: Arc<StubText>) -> StubLoader<dyn TextModel> {
    StubLoader::ready(model as Arc<dyn TextModel>)
}

/// Polls `condition` until it holds, failing after a second.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition did not hold in time");
}
