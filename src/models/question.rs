use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    pub question_text: String,
    pub options: Json<Vec<String>>,
    pub correct_answer: String,
    pub weight: i32,
    pub created_at: DateTime<Utc>,
}

/// What a participant sees: the correct answer stays on the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicQuestion {
    pub id: i64,
    pub exam_id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub weight: i32,
}

/// Full question for the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminQuestion {
    pub id: i64,
    pub exam_id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub weight: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            exam_id: q.exam_id,
            question_text: q.question_text,
            options: q.options.0,
            weight: q.weight,
        }
    }
}

impl From<Question> for AdminQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            exam_id: q.exam_id,
            question_text: q.question_text,
            options: q.options.0,
            correct_answer: q.correct_answer,
            weight: q.weight,
            created_at: q.created_at,
        }
    }
}
