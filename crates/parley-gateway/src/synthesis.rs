// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded worker pool for background speech synthesis.
//!
//! Handlers submit an answer through [`SynthesisQueue::submit`], which creates
//! a task and returns its id without waiting. A fixed number of workers pull
//! jobs from a bounded channel, write the audio through the
//! [`SpeechSynthesizer`], and post the outcome to the [`TaskRegistry`].

use std::sync::Arc;

use parley_core::traits::SpeechSynthesizer;
use parley_media::StaticStore;
use parley_registry::{RecordId, TaskRegistry};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Failure recorded when the queue has no room for another job.
pub const QUEUE_FULL: &str = "Speech synthesis queue is full; try again later.";

/// Failure recorded when a job is submitted after shutdown began.
pub const QUEUE_CLOSED: &str = "Speech synthesis is shutting down.";

/// Failure recorded when the synthesizer or the audio store reports an error.
/// The underlying error is logged, never stored on the task.
pub const SYNTHESIS_FAILED: &str = "Speech synthesis failed.";

/// Failure recorded for jobs still queued when the pool shuts down.
pub const JOB_ABANDONED: &str = "Speech synthesis was cancelled by server shutdown.";

#[derive(Debug)]
struct SynthesisJob {
    task_id: RecordId,
    text: String,
}

/// Submission handle shared by request handlers.
#[derive(Clone)]
pub struct SynthesisQueue {
    tx: mpsc::Sender<SynthesisJob>,
    tasks: Arc<TaskRegistry>,
    closed: CancellationToken,
}

impl SynthesisQueue {
    /// Creates a `processing` task for `text` and enqueues it.
    ///
    /// Never waits. When the queue is full or closed the task is marked
    /// failed immediately, so the returned id is always pollable.
    pub fn submit(&self, text: impl Into<String>) -> RecordId {
        let task_id = self.tasks.create_task();

        if self.closed.is_cancelled() {
            warn!(task_id = %task_id, "synthesis submitted after shutdown");
            self.tasks.fail(task_id.as_str(), QUEUE_CLOSED);
            return task_id;
        }

        let job = SynthesisJob {
            task_id: task_id.clone(),
            text: text.into(),
        };
        match self.tx.try_send(job) {
            Ok(()) => debug!(task_id = %task_id, "synthesis job queued"),
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(task_id = %job.task_id, "synthesis queue full, failing task");
                self.tasks.fail(job.task_id.as_str(), QUEUE_FULL);
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(task_id = %job.task_id, "synthesis queue closed, failing task");
                self.tasks.fail(job.task_id.as_str(), QUEUE_CLOSED);
            }
        }
        task_id
    }

    /// True once [`SynthesisPool::shutdown`] has started.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Sizing of the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

struct Worker {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: StaticStore,
    tasks: Arc<TaskRegistry>,
}

impl Worker {
    async fn run(
        self: Arc<Self>,
        index: usize,
        rx: Arc<Mutex<mpsc::Receiver<SynthesisJob>>>,
        closed: CancellationToken,
    ) {
        debug!(worker = index, "synthesis worker started");
        loop {
            let job = {
                let mut rx = rx.lock().await;
                tokio::select! {
                    biased;
                    _ = closed.cancelled() => None,
                    job = rx.recv() => job,
                }
            };
            let Some(job) = job else { break };
            self.process(job).await;
        }
        debug!(worker = index, "synthesis worker stopped");
    }

    async fn process(&self, job: SynthesisJob) {
        let path = self
            .store
            .audio_path(job.task_id.as_str(), self.synthesizer.audio_format());
        info!(task_id = %job.task_id, path = %path.display(), "synthesizing speech");

        let outcome = match self.synthesizer.synthesize(&job.text, &path).await {
            Ok(()) => self.store.public_url(&path).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(url) => {
                info!(task_id = %job.task_id, audio_url = %url, "speech synthesis complete");
                self.tasks.complete(job.task_id.as_str(), url);
            }
            Err(message) => {
                error!(task_id = %job.task_id, error = %message, "speech synthesis failed");
                self.tasks.fail(job.task_id.as_str(), SYNTHESIS_FAILED);
            }
        }
    }
}

/// The running workers and the queue feeding them.
pub struct SynthesisPool {
    queue: SynthesisQueue,
    rx: Arc<Mutex<mpsc::Receiver<SynthesisJob>>>,
    workers: Vec<JoinHandle<()>>,
}

impl SynthesisPool {
    /// Spawns `config.workers` workers on the current runtime.
    pub fn start(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: StaticStore,
        tasks: Arc<TaskRegistry>,
        config: PoolConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let closed = CancellationToken::new();
        let worker = Arc::new(Worker {
            synthesizer,
            store,
            tasks: Arc::clone(&tasks),
        });

        let workers = (0..config.workers.max(1))
            .map(|index| {
                tokio::spawn(Arc::clone(&worker).run(index, Arc::clone(&rx), closed.clone()))
            })
            .collect::<Vec<_>>();

        info!(
            workers = workers.len(),
            capacity = config.queue_capacity,
            "synthesis pool started"
        );

        Self {
            queue: SynthesisQueue { tx, tasks, closed },
            rx,
            workers,
        }
    }

    /// A handle for submitting jobs.
    pub fn queue(&self) -> SynthesisQueue {
        self.queue.clone()
    }

    /// Closes the queue, waits for in-flight jobs, and fails anything still
    /// queued. Returns the number of abandoned jobs.
    pub async fn shutdown(self) -> usize {
        self.queue.closed.cancel();
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "synthesis worker panicked");
            }
        }

        let mut rx = self.rx.lock().await;
        rx.close();
        let mut abandoned = 0;
        while let Ok(job) = rx.try_recv() {
            self.queue.tasks.fail(job.task_id.as_str(), JOB_ABANDONED);
            abandoned += 1;
        }
        info!(abandoned, "synthesis pool stopped");
        abandoned
    }
}
