use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::notifier::{NotifyError, WebhookNotifier};
use super::Job;
use crate::errors::AppError;
use crate::generation::orchestrator::ContentOrchestrator;
use crate::generation::variants::generate_variants;
use crate::store::ContentStore;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] AppError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Consumes the job queue. Every job runs in its own task so a slow webhook
/// never holds up usage recording.
pub struct JobWorker {
    orchestrator: Arc<ContentOrchestrator>,
    store: Arc<dyn ContentStore>,
    notifier: WebhookNotifier,
    max_attempts: u32,
}

impl JobWorker {
    pub fn new(
        orchestrator: Arc<ContentOrchestrator>,
        store: Arc<dyn ContentStore>,
        notifier: WebhookNotifier,
        max_attempts: u32,
    ) -> Self {
        Self {
            orchestrator,
            store,
            notifier,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Runs until every queue handle is dropped.
    pub async fn run(self: Arc<Self>, mut receiver: mpsc::Receiver<Job>) {
        info!("Job worker started");
        while let Some(job) = receiver.recv().await {
            let worker = Arc::clone(&self);
            tokio::spawn(async move { worker.handle(job).await });
        }
        info!("Job queue closed, worker exiting");
    }

    async fn handle(&self, job: Job) {
        let kind = job.kind();
        let attempts = if job.is_retryable() {
            self.max_attempts
        } else {
            1
        };

        match retry_with_backoff(attempts, RETRY_BASE_DELAY, || self.process(&job)).await {
            Ok(()) => debug!(kind, "Job completed"),
            Err(e) => error!(kind, error = %e, "Job failed permanently"),
        }
    }

    pub async fn process(&self, job: &Job) -> Result<(), JobError> {
        match job {
            Job::RecordUsage(record) => self.store.insert_cost_record(record.clone()).await?,
            Job::TrackEvent(event) => self.store.insert_event(event.clone()).await?,
            Job::GenerateVariants {
                request,
                original_id,
            } => {
                generate_variants(&self.orchestrator, request, *original_id).await?;
            }
            Job::Notify { url, event, data } => self.notifier.send(url, event, data).await?,
        }
        Ok(())
    }
}

/// Runs `op` up to `max_attempts` times, doubling the delay after each failure.
pub async fn retry_with_backoff<F, Fut, T>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JobError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = base_delay * 2u32.pow(attempt - 1);
                warn!(attempt, max_attempts, error = %e, "Job attempt failed, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
