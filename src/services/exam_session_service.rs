use std::sync::Arc;
use std::time::Duration;

use crate::cache::{get_json, keys, set_json, KvCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::exam_session::{DraftAnswer, ExamSession};
use crate::stores::AnswerStore;
use crate::utils::time::Clock;

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub default_duration_secs: i64,
    pub max_duration_secs: i64,
    /// Extra cache lifetime after the clock hits zero, during which the timer
    /// reads 0 instead of NotFound.
    pub grace_secs: i64,
    pub draft_ttl: Duration,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_duration_secs: config.default_exam_duration_secs,
            max_duration_secs: config.max_exam_duration_secs,
            grace_secs: config.session_grace_secs,
            draft_ttl: config.draft_ttl(),
        }
    }
}

/// Timed exam sessions and draft answers. Sessions exist only in the cache;
/// expiry is the cache TTL, there is no ticking timer.
#[derive(Clone)]
pub struct ExamSessionService {
    cache: Arc<dyn KvCache>,
    answers: Arc<dyn AnswerStore>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
}

impl ExamSessionService {
    pub fn new(
        cache: Arc<dyn KvCache>,
        answers: Arc<dyn AnswerStore>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            cache,
            answers,
            clock,
            settings,
        }
    }

    /// Starts (or restarts) the clock for `user_id` on `exam_id`. A second
    /// call replaces the running session and resets the clock.
    pub async fn start_session(
        &self,
        user_id: i64,
        exam_id: i64,
        duration: Option<i64>,
    ) -> Result<ExamSession> {
        let duration = duration.unwrap_or(self.settings.default_duration_secs);
        if duration <= 0 || duration > self.settings.max_duration_secs {
            return Err(Error::BadRequest(format!(
                "duration must be between 1 and {} seconds",
                self.settings.max_duration_secs
            )));
        }

        let session = ExamSession {
            user_id,
            exam_id,
            start_time: self.clock.now(),
            duration,
        };
        let ttl = Duration::from_secs((duration + self.settings.grace_secs.max(0)) as u64);
        let key = keys::exam_session_key(user_id, exam_id);
        set_json(self.cache.as_ref(), &key, &session, ttl).await?;

        tracing::info!(user_id, exam_id, duration, "exam session started");
        Ok(session)
    }

    /// Seconds left in the session. `NotFound` once the session has expired
    /// (or never started); callers treat that as time being up.
    pub async fn remaining_time(&self, user_id: i64, exam_id: i64) -> Result<i64> {
        let key = keys::exam_session_key(user_id, exam_id);
        let session: ExamSession = get_json(self.cache.as_ref(), &key)
            .await?
            .ok_or_else(|| Error::NotFound("Exam session not found or time is up".to_string()))?;
        Ok(session.remaining_seconds(self.clock.now()))
    }

    /// Last write wins. The cache copy is what participants read back; the
    /// durable row only mirrors it while no final answer exists.
    pub async fn save_draft(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: String,
    ) -> Result<DraftAnswer> {
        let draft = DraftAnswer {
            participant_id,
            question_id,
            answer_text,
            updated_at: self.clock.now(),
        };
        let key = keys::draft_answer_key(participant_id, question_id);
        set_json(self.cache.as_ref(), &key, &draft, self.settings.draft_ttl).await?;

        let mirrored = self
            .answers
            .upsert_draft(participant_id, question_id, &draft.answer_text, draft.updated_at)
            .await?;
        if mirrored.is_none() {
            tracing::debug!(
                participant_id,
                question_id,
                "final answer already stored, durable draft left untouched"
            );
        }
        Ok(draft)
    }

    pub async fn get_draft(&self, participant_id: i64, question_id: i64) -> Result<DraftAnswer> {
        let key = keys::draft_answer_key(participant_id, question_id);
        get_json(self.cache.as_ref(), &key)
            .await?
            .ok_or_else(|| Error::NotFound("Draft answer not found".to_string()))
    }
}
