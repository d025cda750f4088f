use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}
