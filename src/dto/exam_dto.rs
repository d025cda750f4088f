use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct StartExamRequest {
    /// Seconds. Falls back to the exam's own duration, then the server default.
    #[validate(range(min = 1, message = "Duration must be at least 1 second"))]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StartExamResponse {
    pub success: bool,
    pub start_time: DateTime<Utc>,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerResponse {
    pub success: bool,
    pub remaining_time: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExamResultResponse {
    pub exam_id: i64,
    pub score: i64,
    pub max_score: i64,
    pub answered: usize,
    pub total_questions: usize,
}
