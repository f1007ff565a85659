//! Bounded concurrent worker pool that runs VLM inference off the pipeline thread.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use aegis_models::SemanticDetection;

use crate::backend::SemanticBackend;
use crate::config::SemanticConfig;
use crate::error::SemanticResult;
use crate::phash::Crop;

/// Results older than this are considered stale and dropped on retrieval,
/// per the pipeline's cross-frame ordering guarantee.
const STALE_RESULT_AGE: Duration = Duration::from_secs(2);

struct Job {
    track_id: u64,
    frame_id: u64,
    crop: Crop,
    prompt: String,
}

struct Inner {
    queue: VecDeque<Job>,
    results: HashMap<u64, (SemanticDetection, Instant)>,
}

/// `submit` is non-blocking and coalesces by identity; `get_results` is
/// non-blocking and drains whatever workers have finished. The pipeline
/// thread never awaits a worker.
pub struct SemanticExecutor {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    config: SemanticConfig,
}

impl SemanticExecutor {
    pub fn new(config: SemanticConfig, backend: Arc<dyn SemanticBackend>) -> SemanticResult<Self> {
        config.validate()?;
        let inner = Arc::new(Mutex::new(Inner { queue: VecDeque::new(), results: HashMap::new() }));
        let notify = Arc::new(Notify::new());
        let (shutdown_tx, _) = watch::channel(false);

        let mut workers = Vec::with_capacity(config.max_concurrent_requests);
        for worker_id in 0..config.max_concurrent_requests {
            let inner = Arc::clone(&inner);
            let notify = Arc::clone(&notify);
            let shutdown_rx = shutdown_tx.subscribe();
            let backend = Arc::clone(&backend);
            let config = config.clone();
            workers.push(tokio::spawn(worker_loop(worker_id, inner, notify, shutdown_rx, backend, config)));
        }

        Ok(Self {
            inner,
            notify,
            shutdown_tx,
            workers: tokio::sync::Mutex::new(workers),
            config,
        })
    }

    /// Enqueue a lookup for `track_id`. Coalesces with any queued job for the
    /// same identity; drops submissions for new identities once the queue is
    /// at capacity, logging a warning. Returns whether the job was accepted.
    pub fn submit(&self, track_id: u64, frame_id: u64, crop: Crop, prompt: String) -> bool {
        let mut inner = self.inner.lock().expect("executor mutex poisoned");
        if let Some(existing) = inner.queue.iter_mut().find(|j| j.track_id == track_id) {
            *existing = Job { track_id, frame_id, crop, prompt };
            self.notify.notify_one();
            return true;
        }
        if inner.queue.len() >= self.config.executor_queue_cap {
            warn!(track_id, "semantic executor queue full, dropping submission");
            return false;
        }
        inner.queue.push_back(Job { track_id, frame_id, crop, prompt });
        self.notify.notify_one();
        true
    }

    /// Drain and return all completed, non-stale results. Non-blocking.
    pub fn get_results(&self) -> Vec<SemanticDetection> {
        let mut inner = self.inner.lock().expect("executor mutex poisoned");
        let results = std::mem::take(&mut inner.results);
        let now = Instant::now();
        results
            .into_values()
            .filter(|(_, completed_at)| now.duration_since(*completed_at) < STALE_RESULT_AGE)
            .map(|(detection, _)| detection)
            .collect()
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().expect("executor mutex poisoned").queue.len()
    }

    /// Stop accepting implicit new work, wait up to `shutdown_grace` for
    /// in-flight jobs, then cancel whatever remains. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        self.notify.notify_waiters();

        let mut workers = self.workers.lock().await;
        let handles = std::mem::take(&mut *workers);
        let grace = self.config.shutdown_grace;
        let joined = tokio::time::timeout(grace, futures_join_all(handles)).await;
        if joined.is_err() {
            warn!("semantic executor workers did not finish within shutdown_grace; jobs cancelled");
        }
    }
}

async fn futures_join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

async fn worker_loop(
    worker_id: usize,
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    mut shutdown_rx: watch::Receiver<bool>,
    backend: Arc<dyn SemanticBackend>,
    config: SemanticConfig,
) {
    loop {
        if *shutdown_rx.borrow() {
            return;
        }

        let job = {
            let mut guard = inner.lock().expect("executor mutex poisoned");
            guard.queue.pop_front()
        };

        let Some(job) = job else {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        return;
                    }
                }
                _ = notify.notified() => {}
            }
            continue;
        };

        debug!(worker_id, track_id = job.track_id, "running semantic inference");
        match run_with_retry(backend.as_ref(), &job, &config).await {
            Ok(mut detections) if !detections.is_empty() => {
                let best = detections.remove(0);
                let detection = SemanticDetection {
                    track_id: job.track_id,
                    frame_id: job.frame_id,
                    label: best.label,
                    confidence: best.confidence,
                    description: best.description,
                    matched_phrase: best.matched_phrase,
                    completed_at: Utc::now(),
                };
                let mut guard = inner.lock().expect("executor mutex poisoned");
                guard.results.insert(job.track_id, (detection, Instant::now()));
            }
            Ok(_) => {}
            Err(err) => {
                warn!(worker_id, track_id = job.track_id, error = %err, "semantic inference failed after retry");
            }
        }
    }
}

/// Single retry with jitter on timeout or backend error, per the spec's
/// "never propagate semantic backend failures to the main pipeline" policy.
async fn run_with_retry(
    backend: &dyn SemanticBackend,
    job: &Job,
    config: &SemanticConfig,
) -> SemanticResult<Vec<crate::backend::BackendDetection>> {
    match attempt(backend, job, config).await {
        Ok(result) => Ok(result),
        Err(_) => {
            let jitter_ms = rand::rng().random_range(50..250);
            tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
            attempt(backend, job, config).await
        }
    }
}

async fn attempt(
    backend: &dyn SemanticBackend,
    job: &Job,
    config: &SemanticConfig,
) -> SemanticResult<Vec<crate::backend::BackendDetection>> {
    match tokio::time::timeout(config.vlm_soft_timeout, backend.infer(&job.crop, &job.prompt)).await {
        Ok(result) => result,
        Err(_) => Err(crate::error::SemanticError::Timeout(config.vlm_soft_timeout)),
    }
}
