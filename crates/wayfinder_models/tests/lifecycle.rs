//! Lifecycle behavior of [`ModelLifecycleManager`] with stub backends.

mod common;

use async_trait::async_trait;
use common::{StubLoader, StubVision, eventually};
use core::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wayfinder_models::capability::{ImageInput, VisionModel, VisionRequest};
use wayfinder_models::error::{InferenceError, LifecycleError, LoadError};
use wayfinder_models::lifecycle::{InitOutcome, ModelLifecycleManager, ModelLoader, ModelStatus};

type Vision = ModelLifecycleManager<dyn VisionModel>;

fn manager(loader: &Arc<StubLoader<dyn VisionModel>>) -> Arc<Vision> {
    let shared: Arc<dyn ModelLoader<Model = dyn VisionModel>> = loader.clone();
    Arc::new(Vision::from_shared("VQA", shared))
}

async fn ask(manager: &Vision) -> Result<String, LifecycleError> {
    let request = VisionRequest::question(ImageInput::placeholder(), "Where is this?");
    manager
        .invoke(|model| async move { model.chat(request).await })
        .await
}

fn stub(reply: &str) -> Result<Arc<dyn VisionModel>, String> {
    Ok(StubVision::answering(reply) as Arc<dyn VisionModel>)
}

#[tokio::test]
async fn never_initialized_manager_is_unavailable() {
    let loader = Arc::new(StubLoader::new(vec![]));
    let manager = manager(&loader);

    let status = manager.status();
    assert_eq!(status.status, ModelStatus::NotInitialized);
    assert!(!status.is_ready && !status.is_loading);

    let err = ask(&manager).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ModelUnavailable { detail: None, .. }));
    assert_eq!(loader.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_initialize_makes_model_ready() {
    let loader = Arc::new(StubLoader::new(vec![stub("Eiffel Tower")]));
    let manager = manager(&loader);

    assert_eq!(manager.initialize().await.unwrap(), InitOutcome::Loaded);

    let status = manager.status();
    assert_eq!(status.status, ModelStatus::Ready);
    assert!(status.is_ready);
    assert!(status.error_detail.is_none());
    assert_eq!(ask(&manager).await.unwrap(), "Eiffel Tower");
}

#[tokio::test]
async fn initialize_while_loading_starts_nothing() {
    let gate = Arc::new(Notify::new());
    let loader = Arc::new(StubLoader::new(vec![stub("Big Ben")]).gated(Arc::clone(&gate)));
    let manager = manager(&loader);

    let first = manager.spawn_initialize();
    eventually(|| manager.status().is_loading).await;

    assert_eq!(manager.initialize().await.unwrap(), InitOutcome::AlreadyLoading);
    assert!(matches!(ask(&manager).await, Err(LifecycleError::ModelBusy { .. })));

    gate.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), InitOutcome::Loaded);
    assert_eq!(loader.attempts.load(Ordering::SeqCst), 1);
    assert!(manager.status().is_ready);
}

#[tokio::test]
async fn out_of_memory_is_reported_everywhere() {
    let loader = Arc::new(StubLoader::new(vec![Err("out of memory".to_string())]));
    let manager = manager(&loader);

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(err, LifecycleError::ConstructionFailure { ref detail, .. } if detail == "out of memory"));

    let status = manager.status();
    assert_eq!(status.status, ModelStatus::Error);
    assert_eq!(status.error_detail.as_deref(), Some("out of memory"));

    let err = ask(&manager).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ModelUnavailable { .. }));
    assert!(err.to_string().contains("out of memory"));
}

#[tokio::test]
async fn failed_initialize_can_be_retried() {
    let loader = Arc::new(StubLoader::new(vec![
        Err("connection reset".to_string()),
        stub("Sagrada Familia"),
    ]));
    let manager = manager(&loader);

    assert!(manager.initialize().await.is_err());
    assert_eq!(manager.initialize().await.unwrap(), InitOutcome::Loaded);

    assert_eq!(manager.load_attempts(), 2);
    assert!(manager.status().error_detail.is_none());
    assert_eq!(ask(&manager).await.unwrap(), "Sagrada Familia");
}

#[tokio::test]
async fn inference_failure_keeps_model_ready() {
    let model = StubVision::failing("tensor shape mismatch");
    let loader = Arc::new(StubLoader::ready(model as Arc<dyn VisionModel>));
    let manager = manager(&loader);
    manager.initialize().await.unwrap();

    let err = ask(&manager).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InferenceFailure {
            source: InferenceError::InvalidResponse(_),
            ..
        }
    ));
    assert_eq!(manager.status().status, ModelStatus::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serialized_model_never_runs_two_calls_at_once() {
    let model = StubVision::slow("Louvre", Duration::from_millis(20));
    let loader = Arc::new(StubLoader::ready(Arc::clone(&model) as Arc<dyn VisionModel>));
    let manager = manager(&loader);
    manager.initialize().await.unwrap();

    let calls: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { ask(&manager).await })
        })
        .collect();
    for call in calls {
        assert_eq!(call.await.unwrap().unwrap(), "Louvre");
    }

    assert_eq!(model.calls(), 4);
    assert_eq!(model.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unlimited_model_accepts_overlapping_calls() {
    let model = StubVision::slow("Louvre", Duration::from_millis(50));
    let loader = Arc::new(
        StubLoader::ready(Arc::clone(&model) as Arc<dyn VisionModel>).concurrency(None),
    );
    let manager = manager(&loader);
    manager.initialize().await.unwrap();

    let (a, b) = tokio::join!(ask(&manager), ask(&manager));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(model.max_active.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn aborted_load_task_records_error() {
    let gate = Arc::new(Notify::new());
    let loader = Arc::new(StubLoader::new(vec![stub("Acropolis")]).gated(gate));
    let manager = manager(&loader);

    let attempt = manager.spawn_initialize();
    eventually(|| manager.status().is_loading).await;
    attempt.abort();
    eventually(|| manager.status().status == ModelStatus::Error).await;

    assert!(manager.status().error_detail.is_some());
}

struct PanickingLoader;

#[async_trait]
impl ModelLoader for PanickingLoader {
    type Model = dyn VisionModel;

    async fn load(&self) -> Result<Arc<dyn VisionModel>, LoadError> {
        panic!("weights file is corrupt");
    }
}

#[tokio::test]
async fn panicking_loader_records_error() {
    let manager = Arc::new(Vision::new("VQA", PanickingLoader));

    let outcome = manager.spawn_initialize().await;
    assert!(outcome.unwrap_err().is_panic());

    let status = manager.status();
    assert_eq!(status.status, ModelStatus::Error);
    assert!(status.error_detail.is_some());
    assert!(matches!(
        ask(&manager).await,
        Err(LifecycleError::ModelUnavailable { detail: Some(_), .. })
    ));
}
