use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::number_or_numeric_string;
use crate::models::submission::SubmissionState;
use crate::services::submission_service::FinalAnswer;

pub const MAX_ANSWER_LEN: u64 = 10_000;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveDraftRequest {
    #[validate(range(min = 1, message = "question_id must be positive"))]
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub question_id: i64,
    #[validate(length(max = 10000, message = "Answer is too long"))]
    pub answer_text: String,
}

/// One element of the final-submission array body.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitAnswerItem {
    #[validate(range(min = 1, message = "question_id must be positive"))]
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub question_id: i64,
    #[validate(length(max = 10000, message = "Answer is too long"))]
    pub answer_text: String,
}

impl From<SubmitAnswerItem> for FinalAnswer {
    fn from(item: SubmitAnswerItem) -> Self {
        Self {
            question_id: item.question_id,
            answer_text: item.answer_text,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub submission_id: Uuid,
    pub status: SubmissionState,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DraftResponse {
    pub success: bool,
    pub question_id: i64,
    pub answer_text: String,
    pub updated_at: DateTime<Utc>,
}
