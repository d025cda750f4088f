use sqlx::types::Json;
use sqlx::PgPool;

use crate::dto::admin_dto::{CreateQuestionPayload, UpdateQuestionPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;

const QUESTION_COLUMNS: &str =
    "id, exam_id, question_text, options, correct_answer, weight, created_at";

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_questions(&self) -> Result<Vec<Question>> {
        let sql = format!("SELECT {} FROM questions ORDER BY exam_id, id", QUESTION_COLUMNS);
        let questions = sqlx::query_as::<_, Question>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }

    pub async fn questions_for_exam(&self, exam_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE exam_id = $1 ORDER BY id",
            QUESTION_COLUMNS
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(exam_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }

    pub async fn get_question(&self, question_id: i64) -> Result<Question> {
        let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
        sqlx::query_as::<_, Question>(&sql)
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    pub async fn create_question(&self, payload: CreateQuestionPayload) -> Result<Question> {
        let sql = format!(
            r#"
            INSERT INTO questions (exam_id, question_text, options, correct_answer, weight)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );
        let question = sqlx::query_as::<_, Question>(&sql)
            .bind(payload.exam_id)
            .bind(payload.question_text)
            .bind(Json(payload.options))
            .bind(payload.correct_answer)
            .bind(payload.weight)
            .fetch_one(&self.pool)
            .await
            .map_err(unknown_exam)?;
        tracing::info!(question_id = question.id, exam_id = question.exam_id, "question created");
        Ok(question)
    }

    pub async fn update_question(
        &self,
        question_id: i64,
        payload: UpdateQuestionPayload,
    ) -> Result<Question> {
        let sql = format!(
            r#"
            UPDATE questions
            SET exam_id = COALESCE($2, exam_id),
                question_text = COALESCE($3, question_text),
                options = COALESCE($4, options),
                correct_answer = COALESCE($5, correct_answer),
                weight = COALESCE($6, weight)
            WHERE id = $1
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );
        sqlx::query_as::<_, Question>(&sql)
            .bind(question_id)
            .bind(payload.exam_id)
            .bind(payload.question_text)
            .bind(payload.options.map(Json))
            .bind(payload.correct_answer)
            .bind(payload.weight)
            .fetch_optional(&self.pool)
            .await
            .map_err(unknown_exam)?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Question not found".to_string()));
        }
        Ok(())
    }
}

fn unknown_exam(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            Error::BadRequest("Exam does not exist".to_string())
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::admin_dto::CreateExamPayload;
    use crate::services::exam_service::ExamService;
    use sqlx::postgres::PgPoolOptions;

    async fn setup_test_db() -> PgPool {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to create test pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn question_crud_and_exam_cascade() {
        let pool = setup_test_db().await;
        let exams = ExamService::new(pool.clone());
        let service = QuestionService::new(pool);

        let exam = exams
            .create_exam(CreateExamPayload {
                title: "Kuis".into(),
                description: None,
                duration_seconds: 600,
            })
            .await
            .unwrap();

        let q = service
            .create_question(CreateQuestionPayload {
                exam_id: exam.id,
                question_text: "Ibu kota Indonesia?".into(),
                options: vec!["Jakarta".into(), "Bandung".into()],
                correct_answer: "Jakarta".into(),
                weight: 2,
            })
            .await
            .unwrap();
        assert_eq!(q.options.0.len(), 2);

        let updated = service
            .update_question(
                q.id,
                UpdateQuestionPayload {
                    exam_id: None,
                    question_text: None,
                    options: None,
                    correct_answer: None,
                    weight: Some(5),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.weight, 5);
        assert_eq!(updated.correct_answer, "Jakarta");

        let orphan = service
            .create_question(CreateQuestionPayload {
                exam_id: i64::MAX,
                question_text: "?".into(),
                options: vec![],
                correct_answer: "x".into(),
                weight: 1,
            })
            .await;
        assert!(matches!(orphan, Err(Error::BadRequest(_))));

        exams.delete_exam(exam.id).await.unwrap();
        assert!(service.questions_for_exam(exam.id).await.unwrap().is_empty());
    }
}
