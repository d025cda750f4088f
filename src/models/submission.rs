use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Accepted,
    Processing,
    Completed,
    PartiallyFailed,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Completed | SubmissionState::PartiallyFailed | SubmissionState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedItem {
    pub question_id: i64,
    pub error: String,
}

/// Progress record of one final submission, kept in the cache under
/// `submission_status:{id}` so clients can poll for the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionStatus {
    pub id: Uuid,
    pub participant_id: i64,
    pub state: SubmissionState,
    pub total_items: usize,
    pub persisted_items: usize,
    pub failed_items: Vec<FailedItem>,
    pub accepted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SubmissionStatus {
    pub fn accepted(id: Uuid, participant_id: i64, total_items: usize, at: DateTime<Utc>) -> Self {
        Self {
            id,
            participant_id,
            state: SubmissionState::Accepted,
            total_items,
            persisted_items: 0,
            failed_items: Vec::new(),
            accepted_at: at,
            finished_at: None,
        }
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.state = if self.failed_items.is_empty() {
            SubmissionState::Completed
        } else if self.persisted_items == 0 {
            SubmissionState::Failed
        } else {
            SubmissionState::PartiallyFailed
        };
        self.finished_at = Some(at);
    }
}
