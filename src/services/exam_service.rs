use sqlx::PgPool;

use crate::dto::admin_dto::{CreateExamPayload, UpdateExamPayload};
use crate::error::{Error, Result};
use crate::models::exam::Exam;

#[derive(Clone)]
pub struct ExamService {
    pool: PgPool,
}

impl ExamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_exams(&self) -> Result<Vec<Exam>> {
        let exams = sqlx::query_as::<_, Exam>(
            r#"SELECT id, title, description, duration_seconds, created_at FROM exams ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(exams)
    }

    pub async fn find_exam(&self, exam_id: i64) -> Result<Option<Exam>> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"SELECT id, title, description, duration_seconds, created_at FROM exams WHERE id = $1"#,
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exam)
    }

    pub async fn get_exam(&self, exam_id: i64) -> Result<Exam> {
        self.find_exam(exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Exam not found".to_string()))
    }

    pub async fn create_exam(&self, payload: CreateExamPayload) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            INSERT INTO exams (title, description, duration_seconds)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, duration_seconds, created_at
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.description)
        .bind(payload.duration_seconds)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(exam_id = exam.id, "exam created");
        Ok(exam)
    }

    pub async fn update_exam(&self, exam_id: i64, payload: UpdateExamPayload) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            UPDATE exams
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                duration_seconds = COALESCE($4, duration_seconds)
            WHERE id = $1
            RETURNING id, title, description, duration_seconds, created_at
            "#,
        )
        .bind(exam_id)
        .bind(payload.title.map(|t| t.trim().to_string()))
        .bind(payload.description)
        .bind(payload.duration_seconds)
        .fetch_optional(&self.pool)
        .await?;
        exam.ok_or_else(|| Error::NotFound("Exam not found".to_string()))
    }

    /// Questions go with the exam (ON DELETE CASCADE); answers stay.
    pub async fn delete_exam(&self, exam_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(exam_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Exam not found".to_string()));
        }
        tracing::info!(exam_id, "exam deleted");
        Ok(())
    }
}
