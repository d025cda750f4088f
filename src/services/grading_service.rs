use std::collections::HashMap;

use crate::dto::exam_dto::ExamResultResponse;
use crate::models::answer::Answer;
use crate::models::question::Question;

pub struct GradingService;

impl GradingService {
    /// Sums the weight of every question whose final answer matches the
    /// correct answer, ignoring surrounding whitespace and case. Draft rows
    /// and answers to other exams' questions are ignored.
    pub fn score(exam_id: i64, questions: &[Question], answers: &[Answer]) -> ExamResultResponse {
        let finals: HashMap<i64, &str> = answers
            .iter()
            .filter(|a| !a.is_draft)
            .map(|a| (a.question_id, a.answer_text.as_str()))
            .collect();

        let mut score = 0i64;
        let mut max_score = 0i64;
        let mut answered = 0usize;

        for q in questions {
            max_score += q.weight as i64;
            let Some(given) = finals.get(&q.id) else {
                continue;
            };
            answered += 1;
            if normalize(given) == normalize(&q.correct_answer) {
                score += q.weight as i64;
            }
        }

        ExamResultResponse {
            exam_id,
            score,
            max_score,
            answered,
            total_questions: questions.len(),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
