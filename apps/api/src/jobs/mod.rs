//! Background work: typed jobs on a bounded channel, consumed by [`JobWorker`].
//!
//! Enqueueing never blocks and never fails the caller. A full or closed queue
//! drops the job with a warning.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::generation::request::GenerationRequest;
use crate::models::usage::{AnalyticsEvent, NewCostRecord};

pub mod notifier;
pub mod worker;

pub use notifier::WebhookNotifier;
pub use worker::JobWorker;

#[derive(Debug, Clone)]
pub enum Job {
    RecordUsage(NewCostRecord),
    TrackEvent(AnalyticsEvent),
    GenerateVariants {
        request: GenerationRequest,
        original_id: Uuid,
    },
    Notify {
        url: String,
        event: String,
        data: Value,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::RecordUsage(_) => "record_usage",
            Job::TrackEvent(_) => "track_event",
            Job::GenerateVariants { .. } => "generate_variants",
            Job::Notify { .. } => "notify",
        }
    }

    /// Variant generation absorbs per-variant failures itself; rerunning it
    /// would duplicate the variants that did succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Job::GenerateVariants { .. })
    }
}

#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<Job>,
}

impl JobQueue {
    /// Returns the queue and the receiver a [`JobWorker`] consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Job>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Non-blocking enqueue. Returns whether the job was accepted.
    pub fn enqueue(&self, job: Job) -> bool {
        let kind = job.kind();
        match self.sender.try_send(job) {
            Ok(()) => {
                debug!(kind, "Job queued");
                true
            }
            Err(e) => {
                warn!(kind, "Background job dropped: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str) -> Job {
        Job::TrackEvent(AnalyticsEvent {
            event_type: name.to_string(),
            content_id: None,
            data: json!({}),
        })
    }

    #[tokio::test]
    async fn test_enqueue_delivers_in_order() {
        let (queue, mut rx) = JobQueue::new(4);
        assert!(queue.enqueue(event("a")));
        assert!(queue.enqueue(event("b")));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, Job::TrackEvent(ref e) if e.event_type == "a"));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (queue, _rx) = JobQueue::new(1);
        assert!(queue.enqueue(event("a")));
        assert!(!queue.enqueue(event("b")));
    }

    #[test]
    fn test_closed_queue_drops() {
        let (queue, rx) = JobQueue::new(1);
        drop(rx);
        assert!(!queue.enqueue(event("a")));
    }

    #[test]
    fn test_variant_jobs_are_not_retried() {
        use crate::generation::request::ContentCategory;
        let job = Job::GenerateVariants {
            request: GenerationRequest::sample(ContentCategory::Message, "Spring sale"),
            original_id: Uuid::new_v4(),
        };
        assert!(!job.is_retryable());
        assert!(event("x").is_retryable());
    }
}
