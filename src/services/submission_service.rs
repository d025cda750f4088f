use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cache::{get_json, keys, set_json, KvCache};
use crate::error::{Error, Result};
use crate::models::submission::{FailedItem, SubmissionState, SubmissionStatus};
use crate::stores::AnswerStore;
use crate::utils::time::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
    pub question_id: i64,
    pub answer_text: String,
}

#[derive(Debug, Clone)]
pub struct SubmissionJob {
    pub id: Uuid,
    pub participant_id: i64,
    pub items: Vec<FinalAnswer>,
    pub accepted_at: DateTime<Utc>,
}

/// Builds the accepting half and the worker half around one bounded channel.
pub fn submission_channel(
    capacity: usize,
    cache: Arc<dyn KvCache>,
    answers: Arc<dyn AnswerStore>,
    clock: Arc<dyn Clock>,
    status_ttl: Duration,
) -> (SubmissionQueue, SubmissionWorker) {
    let (sender, receiver) = mpsc::channel(capacity);
    let queue = SubmissionQueue {
        sender,
        capacity,
        cache: cache.clone(),
        clock: clock.clone(),
        status_ttl,
    };
    let worker = SubmissionWorker {
        receiver: Arc::new(Mutex::new(receiver)),
        answers,
        cache,
        clock,
        status_ttl,
    };
    (queue, worker)
}

#[derive(Clone)]
pub struct SubmissionQueue {
    sender: mpsc::Sender<SubmissionJob>,
    capacity: usize,
    cache: Arc<dyn KvCache>,
    clock: Arc<dyn Clock>,
    status_ttl: Duration,
}

impl SubmissionQueue {
    /// Accepts a final submission for background persistence. The status
    /// record is written before the job is handed to a worker, so a poll
    /// right after acceptance always finds it.
    pub async fn submit(
        &self,
        participant_id: i64,
        items: Vec<FinalAnswer>,
    ) -> Result<SubmissionStatus> {
        let permit = self.sender.try_reserve().map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!(participant_id, "submission queue full, rejecting");
                Error::Unavailable("Submission queue is full, try again shortly".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                Error::Unavailable("Submission workers are shut down".to_string())
            }
        })?;

        let accepted_at = self.clock.now();
        let status = SubmissionStatus::accepted(Uuid::new_v4(), participant_id, items.len(), accepted_at);
        set_json(
            self.cache.as_ref(),
            &keys::submission_status_key(status.id),
            &status,
            self.status_ttl,
        )
        .await?;

        permit.send(SubmissionJob {
            id: status.id,
            participant_id,
            items,
            accepted_at,
        });
        tracing::info!(
            submission_id = %status.id,
            participant_id,
            items = status.total_items,
            "final submission accepted"
        );
        Ok(status)
    }

    /// Status of a submission owned by `participant_id`. Other participants'
    /// submissions read as missing.
    pub async fn status(&self, participant_id: i64, id: Uuid) -> Result<SubmissionStatus> {
        let status: Option<SubmissionStatus> =
            get_json(self.cache.as_ref(), &keys::submission_status_key(id)).await?;
        match status {
            Some(s) if s.participant_id == participant_id => Ok(s),
            _ => Err(Error::NotFound("Submission not found".to_string())),
        }
    }

    /// Jobs waiting for a worker.
    pub fn pending(&self) -> usize {
        self.capacity.saturating_sub(self.sender.capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Clone)]
pub struct SubmissionWorker {
    receiver: Arc<Mutex<mpsc::Receiver<SubmissionJob>>>,
    answers: Arc<dyn AnswerStore>,
    cache: Arc<dyn KvCache>,
    clock: Arc<dyn Clock>,
    status_ttl: Duration,
}

impl SubmissionWorker {
    /// Takes one job off the queue and persists it. Returns false once every
    /// queue handle is dropped and the queue is drained.
    pub async fn run_once(&self) -> bool {
        let job = {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        };
        match job {
            Some(job) => {
                self.process(job).await;
                true
            }
            None => false,
        }
    }

    pub fn spawn(self, workers: usize) -> Vec<JoinHandle<()>> {
        (0..workers)
            .map(|n| {
                let worker = self.clone();
                tokio::spawn(async move {
                    tracing::debug!(worker = n, "submission worker started");
                    while worker.run_once().await {}
                    tracing::debug!(worker = n, "submission worker stopped");
                })
            })
            .collect()
    }

    /// Persists every item independently: durable upsert first, then the
    /// draft eviction. Neither kind of failure stops the remaining items.
    pub async fn process(&self, job: SubmissionJob) -> SubmissionStatus {
        let mut status =
            SubmissionStatus::accepted(job.id, job.participant_id, job.items.len(), job.accepted_at);
        status.state = SubmissionState::Processing;
        self.write_status(&status).await;

        for item in &job.items {
            let submitted_at = self.clock.now();
            match self
                .answers
                .upsert_final(job.participant_id, item.question_id, &item.answer_text, submitted_at)
                .await
            {
                Ok(_) => {
                    status.persisted_items += 1;
                    let key = keys::draft_answer_key(job.participant_id, item.question_id);
                    if let Err(e) = self.cache.delete(&key).await {
                        tracing::warn!(
                            submission_id = %job.id,
                            question_id = item.question_id,
                            error = %e,
                            "failed to evict draft after final save"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(
                        submission_id = %job.id,
                        participant_id = job.participant_id,
                        question_id = item.question_id,
                        error = %e,
                        "failed to persist final answer"
                    );
                    status.failed_items.push(FailedItem {
                        question_id: item.question_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        status.finish(self.clock.now());
        self.write_status(&status).await;
        tracing::info!(
            submission_id = %job.id,
            state = ?status.state,
            persisted = status.persisted_items,
            failed = status.failed_items.len(),
            "final submission processed"
        );
        status
    }

    async fn write_status(&self, status: &SubmissionStatus) {
        let key = keys::submission_status_key(status.id);
        if let Err(e) = set_json(self.cache.as_ref(), &key, status, self.status_ttl).await {
            tracing::error!(submission_id = %status.id, error = %e, "failed to record submission status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, MockKvCache};
    use crate::models::answer::Answer;
    use crate::models::exam_session::DraftAnswer;
    use crate::stores::answer_store::MockAnswerStore;
    use crate::utils::time::ManualClock;

    fn stored(participant_id: i64, question_id: i64, text: &str, at: DateTime<Utc>) -> Answer {
        Answer {
            id: question_id,
            participant_id,
            question_id,
            answer_text: text.to_string(),
            submitted_at: at,
            is_draft: false,
        }
    }

    fn items(ids: &[i64]) -> Vec<FinalAnswer> {
        ids.iter()
            .map(|&question_id| FinalAnswer {
                question_id,
                answer_text: format!("answer {}", question_id),
            })
            .collect()
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::default())
    }

    #[tokio::test]
    async fn persists_items_and_evicts_drafts() {
        let clock = clock();
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new(100, clock.clone()));
        let mut store = MockAnswerStore::new();
        store
            .expect_upsert_final()
            .times(2)
            .returning(|p, q, text, at| Ok(stored(p, q, text, at)));

        let draft = DraftAnswer {
            participant_id: 42,
            question_id: 5,
            answer_text: "Bandung".into(),
            updated_at: clock.now(),
        };
        set_json(cache.as_ref(), &keys::draft_answer_key(42, 5), &draft, Duration::from_secs(60))
            .await
            .unwrap();

        let (queue, worker) =
            submission_channel(8, cache.clone(), Arc::new(store), clock, Duration::from_secs(60));
        let accepted = queue.submit(42, items(&[5, 6])).await.unwrap();
        assert_eq!(accepted.state, SubmissionState::Accepted);
        assert_eq!(queue.pending(), 1);

        assert!(worker.run_once().await);
        let status = queue.status(42, accepted.id).await.unwrap();
        assert_eq!(status.state, SubmissionState::Completed);
        assert_eq!(status.persisted_items, 2);
        assert!(cache.get(&keys::draft_answer_key(42, 5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_draft_eviction_keeps_durable_write() {
        let mut cache = MockKvCache::new();
        cache.expect_set().returning(|_, _, _| Ok(()));
        cache
            .expect_delete()
            .times(1)
            .returning(|_| Err(Error::Cache("connection reset".into())));
        let mut store = MockAnswerStore::new();
        store
            .expect_upsert_final()
            .times(1)
            .returning(|p, q, text, at| Ok(stored(p, q, text, at)));

        let (_queue, worker) = submission_channel(
            1,
            Arc::new(cache),
            Arc::new(store),
            clock(),
            Duration::from_secs(60),
        );
        let status = worker
            .process(SubmissionJob {
                id: Uuid::new_v4(),
                participant_id: 42,
                items: items(&[5]),
                accepted_at: Utc::now(),
            })
            .await;
        assert_eq!(status.state, SubmissionState::Completed);
        assert_eq!(status.persisted_items, 1);
    }

    #[tokio::test]
    async fn durable_failure_is_reported_and_rest_continue() {
        let clock = clock();
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new(100, clock.clone()));
        let mut store = MockAnswerStore::new();
        store.expect_upsert_final().times(3).returning(|p, q, text, at| {
            if q == 2 {
                Err(Error::Internal("disk full".into()))
            } else {
                Ok(stored(p, q, text, at))
            }
        });

        let (queue, worker) =
            submission_channel(4, cache, Arc::new(store), clock, Duration::from_secs(60));
        let accepted = queue.submit(7, items(&[1, 2, 3])).await.unwrap();
        assert!(worker.run_once().await);

        let status = queue.status(7, accepted.id).await.unwrap();
        assert_eq!(status.state, SubmissionState::PartiallyFailed);
        assert_eq!(status.persisted_items, 2);
        assert_eq!(status.failed_items.len(), 1);
        assert_eq!(status.failed_items[0].question_id, 2);
    }

    #[tokio::test]
    async fn full_queue_rejects_without_accepting() {
        let clock = clock();
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new(100, clock.clone()));
        let (queue, _worker) = submission_channel(
            1,
            cache,
            Arc::new(MockAnswerStore::new()),
            clock,
            Duration::from_secs(60),
        );
        queue.submit(1, items(&[1])).await.unwrap();
        let err = queue.submit(1, items(&[2])).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert_eq!(queue.pending(), 1);
    }

    #[tokio::test]
    async fn status_is_private_to_its_participant() {
        let clock = clock();
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new(100, clock.clone()));
        let (queue, _worker) = submission_channel(
            2,
            cache,
            Arc::new(MockAnswerStore::new()),
            clock,
            Duration::from_secs(60),
        );
        let accepted = queue.submit(1, Vec::new()).await.unwrap();
        assert!(queue.status(1, accepted.id).await.is_ok());
        assert!(matches!(
            queue.status(2, accepted.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(queue.status(1, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn workers_stop_when_queue_is_dropped() {
        let clock = clock();
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new(100, clock.clone()));
        let (queue, worker) = submission_channel(
            2,
            cache,
            Arc::new(MockAnswerStore::new()),
            clock,
            Duration::from_secs(60),
        );
        let handles = worker.spawn(2);
        drop(queue);
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
