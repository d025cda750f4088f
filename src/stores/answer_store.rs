use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::answer::Answer;

/// Durable answers, one row per (participant_id, question_id). Writes
/// overwrite the existing row instead of inserting a second one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Writes the final answer (`is_draft = false`), replacing whatever row
    /// exists for the key.
    async fn upsert_final(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Answer>;

    /// Writes a draft row unless a final answer already exists for the key,
    /// in which case nothing changes and `None` is returned.
    async fn upsert_draft(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<Option<Answer>>;

    async fn find(&self, participant_id: i64, question_id: i64) -> Result<Option<Answer>>;

    async fn find_by_participant(&self, participant_id: i64) -> Result<Vec<Answer>>;

    async fn find_all(&self) -> Result<Vec<Answer>>;
}

#[derive(Clone)]
pub struct PgAnswerStore {
    pool: PgPool,
}

impl PgAnswerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnswerStore for PgAnswerStore {
    async fn upsert_final(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Answer> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (participant_id, question_id, answer_text, submitted_at, is_draft)
            VALUES ($1, $2, $3, $4, FALSE)
            ON CONFLICT (participant_id, question_id) DO UPDATE
            SET answer_text = EXCLUDED.answer_text,
                submitted_at = EXCLUDED.submitted_at,
                is_draft = FALSE
            RETURNING id, participant_id, question_id, answer_text, submitted_at, is_draft
            "#,
        )
        .bind(participant_id)
        .bind(question_id)
        .bind(answer_text)
        .bind(submitted_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn upsert_draft(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (participant_id, question_id, answer_text, submitted_at, is_draft)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (participant_id, question_id) DO UPDATE
            SET answer_text = EXCLUDED.answer_text,
                submitted_at = EXCLUDED.submitted_at
            WHERE answers.is_draft
            RETURNING id, participant_id, question_id, answer_text, submitted_at, is_draft
            "#,
        )
        .bind(participant_id)
        .bind(question_id)
        .bind(answer_text)
        .bind(saved_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn find(&self, participant_id: i64, question_id: i64) -> Result<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, participant_id, question_id, answer_text, submitted_at, is_draft
            FROM answers WHERE participant_id = $1 AND question_id = $2
            "#,
        )
        .bind(participant_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn find_by_participant(&self, participant_id: i64) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, participant_id, question_id, answer_text, submitted_at, is_draft
            FROM answers WHERE participant_id = $1 ORDER BY question_id
            "#,
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn find_all(&self) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, participant_id, question_id, answer_text, submitted_at, is_draft
            FROM answers ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }
}
