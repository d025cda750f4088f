//! Cache key layout. The formats are part of the external contract.

use uuid::Uuid;

pub fn exam_session_key(user_id: i64, exam_id: i64) -> String {
    format!("exam_session:{}:{}", user_id, exam_id)
}

pub fn draft_answer_key(user_id: i64, question_id: i64) -> String {
    format!("draft_answer:{}:{}", user_id, question_id)
}

pub fn submission_status_key(submission_id: Uuid) -> String {
    format!("submission_status:{}", submission_id)
}
