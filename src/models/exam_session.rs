use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Timed exam session; lives only in the cache under
/// `exam_session:{user_id}:{exam_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    pub user_id: i64,
    pub exam_id: i64,
    pub start_time: DateTime<Utc>,
    /// Seconds.
    pub duration: i64,
}

impl ExamSession {
    /// Seconds left at `now`, never negative and never above `duration`.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - self.start_time).num_seconds();
        (self.duration - elapsed).clamp(0, self.duration)
    }
}

/// Cache-resident staging copy of an answer, keyed
/// `draft_answer:{participant_id}:{question_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DraftAnswer {
    pub participant_id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub updated_at: DateTime<Utc>,
}
