use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Durable answer row. One row per (participant_id, question_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Answer {
    pub id: i64,
    pub participant_id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub submitted_at: DateTime<Utc>,
    pub is_draft: bool,
}
