//! The recompute worker: consumes rating-mutation jobs, runs the update
//! algorithm, and persists results.
//!
//! Success and failure handling is an explicit result type applied by a
//! supervising loop rather than scattered completion/failure callbacks:
//! each attempt classifies into `Ok | Skipped | Retryable | Fatal`, and
//! the loop owns backoff, dead-lettering, and counters.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::error::UpdateError;
use crate::metrics::EngineMetrics;
use crate::models::{RecomputeJob, SkipReason};
use crate::store::{ItemVectorStore, PreferenceStore};
use crate::update::{self, UpdateOutcome};

const MAX_BACKOFF_MS: u64 = 300_000; // 5 minutes

/// Classification of a single processing attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// New preference state persisted.
    Ok,
    /// Benign no-op; the job is complete.
    Skipped(SkipReason),
    /// Transient failure; retry per policy.
    Retryable(String),
    /// Invariant violation; straight to the dead set, no retries.
    Fatal(String),
}

/// A job that exhausted retries or failed fatally, retained for
/// operator inspection.
#[derive(Debug, Clone)]
pub struct DeadJob {
    pub job: RecomputeJob,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Record of a terminally successful job.
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub job_id: uuid::Uuid,
    pub key: String,
    pub skipped: bool,
    pub finished_at: DateTime<Utc>,
}

/// Single logical worker for the recompute job class.
///
/// Jobs execute strictly one at a time: the update is a read-modify-
/// write over a shared per-user accumulator, so this job class runs at
/// concurrency 1 (see [`WorkerConfig::effective_concurrency`]).
pub struct RecomputeWorker<S, I> {
    states: Arc<S>,
    items: Arc<I>,
    config: WorkerConfig,
    metrics: Option<EngineMetrics>,
    dead_set: Mutex<VecDeque<DeadJob>>,
    completed_log: Mutex<VecDeque<CompletedJob>>,
}

impl<S: PreferenceStore, I: ItemVectorStore> RecomputeWorker<S, I> {
    pub fn new(states: Arc<S>, items: Arc<I>, config: WorkerConfig) -> Self {
        Self {
            states,
            items,
            config,
            metrics: None,
            dead_set: Mutex::new(VecDeque::new()),
            completed_log: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a worker that also updates Prometheus counters.
    pub fn new_with_metrics(
        states: Arc<S>,
        items: Arc<I>,
        config: WorkerConfig,
        metrics: EngineMetrics,
    ) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::new(states, items, config)
        }
    }

    /// Consume jobs until the queue side is closed and drained.
    ///
    /// Should be spawned as a background task. Every job runs to a
    /// terminal state: persisted, skipped, or dead-lettered. One user's
    /// failing jobs never block another user's — a dead-lettered job is
    /// simply recorded and the loop moves on.
    pub async fn run(&self, mut rx: mpsc::Receiver<RecomputeJob>) {
        info!(
            retry_attempts = self.config.retry_attempts,
            backoff_base_ms = self.config.backoff_base_ms,
            concurrency = self.config.effective_concurrency(),
            "recompute worker starting"
        );

        while let Some(job) = rx.recv().await {
            self.run_to_terminal(job).await;
        }

        info!("recompute queue closed, worker exiting");
    }

    /// Snapshot of the dead set, oldest first.
    pub fn dead_jobs(&self) -> Vec<DeadJob> {
        self.dead_set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Snapshot of the completed log, oldest first.
    pub fn completed_jobs(&self) -> Vec<CompletedJob> {
        self.completed_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    async fn run_to_terminal(&self, mut job: RecomputeJob) {
        loop {
            job.attempts_made += 1;

            match self.process(&job).await {
                ProcessResult::Ok => {
                    info!(
                        job_id = %job.id,
                        key = %job.key,
                        operation = job.mutation.operation.as_str(),
                        attempt = job.attempts_made,
                        "recompute job completed"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.jobs_completed.inc();
                    }
                    self.record_completed(&job, false);
                    return;
                }
                ProcessResult::Skipped(reason) => {
                    debug!(
                        job_id = %job.id,
                        key = %job.key,
                        reason = reason.as_str(),
                        "recompute job skipped"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.jobs_skipped.inc();
                    }
                    self.record_completed(&job, true);
                    return;
                }
                ProcessResult::Fatal(reason) => {
                    error!(
                        job_id = %job.id,
                        key = %job.key,
                        error = %reason,
                        "recompute job failed fatally"
                    );
                    self.dead_letter(job, reason);
                    return;
                }
                ProcessResult::Retryable(reason) => {
                    if job.attempts_made >= self.config.retry_attempts {
                        error!(
                            job_id = %job.id,
                            key = %job.key,
                            attempts = job.attempts_made,
                            error = %reason,
                            "recompute job exhausted retries"
                        );
                        self.dead_letter(job, reason);
                        return;
                    }

                    let delay = self.backoff(job.attempts_made);
                    warn!(
                        job_id = %job.id,
                        key = %job.key,
                        attempt = job.attempts_made,
                        backoff_ms = delay.as_millis() as u64,
                        error = %reason,
                        "recompute job failed, retrying"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.jobs_retried.inc();
                    }
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One processing attempt: concurrent state + item fetch, update
    /// algorithm, single persisted write on a non-skip result.
    async fn process(&self, job: &RecomputeJob) -> ProcessResult {
        let user_id = job.mutation.user_id;

        let (state_result, item_result) = tokio::join!(
            self.states.get_state(user_id),
            self.items.get_item_vector(job.mutation.item_id),
        );

        let state = match state_result {
            Ok(state) => state,
            Err(e) => return ProcessResult::Retryable(e.to_string()),
        };
        let item = match item_result {
            Ok(Some(item)) => item,
            Ok(None) => return ProcessResult::Skipped(SkipReason::ItemVectorMissing),
            Err(e) => return ProcessResult::Retryable(e.to_string()),
        };

        match update::apply(&state, &job.mutation, &item) {
            Ok(UpdateOutcome::Updated(new_state)) => {
                match self.states.put_state(user_id, &new_state).await {
                    Ok(()) => ProcessResult::Ok,
                    Err(e) => ProcessResult::Retryable(e.to_string()),
                }
            }
            Ok(UpdateOutcome::Skipped(reason)) => ProcessResult::Skipped(reason),
            // Onboarding may complete between attempts, so the missing
            // baseline is retried like a transient failure.
            Err(e @ UpdateError::IncompleteState) => ProcessResult::Retryable(e.to_string()),
            Err(e @ UpdateError::DimensionMismatch { .. }) => ProcessResult::Fatal(e.to_string()),
        }
    }

    /// Exponential backoff for the next attempt: `base * 2^(n-1)`,
    /// capped at 5 minutes.
    fn backoff(&self, attempts_made: u32) -> Duration {
        let exp = attempts_made.saturating_sub(1).min(20);
        let ms = self
            .config
            .backoff_base_ms
            .saturating_mul(1u64 << exp)
            .min(MAX_BACKOFF_MS);
        Duration::from_millis(ms)
    }

    fn dead_letter(&self, job: RecomputeJob, error: String) {
        if let Some(metrics) = &self.metrics {
            metrics.jobs_dead_lettered.inc();
        }
        // Recording survives lock poisoning: the dead set must never
        // silently discard a job.
        let mut dead = self.dead_set.lock().unwrap_or_else(|e| e.into_inner());
        dead.push_back(DeadJob {
            job,
            error,
            failed_at: Utc::now(),
        });
        while dead.len() > self.config.dead_set_size {
            dead.pop_front();
        }
    }

    fn record_completed(&self, job: &RecomputeJob, skipped: bool) {
        let mut completed = self
            .completed_log
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        completed.push_back(CompletedJob {
            job_id: job.id,
            key: job.key.clone(),
            skipped,
            finished_at: Utc::now(),
        });
        while completed.len() > self.config.completed_log_size {
            completed.pop_front();
        }
    }
}
