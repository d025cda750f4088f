use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::exam_dto::{ExamResultResponse, StartExamRequest, StartExamResponse, TimerResponse},
    error::Result,
    models::{exam::Exam, question::PublicQuestion},
    services::{auth_service::AuthUser, grading_service::GradingService},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/exams",
    responses((status = 200, description = "All exams", body = [Exam]))
)]
pub async fn list_exams(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.exam_service.list_exams().await?))
}

#[utoipa::path(
    get,
    path = "/api/exam/{id}/questions",
    params(("id" = i64, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Questions without correct answers", body = [PublicQuestion]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn get_questions(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let questions: Vec<PublicQuestion> = state
        .question_service
        .questions_for_exam(exam_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();
    Ok(Json(questions))
}

#[utoipa::path(
    post,
    path = "/api/exam/{id}/start",
    params(("id" = i64, Path, description = "Exam ID")),
    request_body(content = StartExamRequest, description = "Optional; duration in seconds"),
    responses(
        (status = 200, description = "Session started, clock reset", body = StartExamResponse),
        (status = 400, description = "Malformed body or duration out of range"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(exam_id): Path<i64>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    // An absent body means "use the exam's duration"; a present one must parse.
    let payload: StartExamRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartExamRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    payload.validate()?;

    let duration = match payload.duration {
        Some(d) => Some(d),
        None => state
            .exam_service
            .find_exam(exam_id)
            .await?
            .map(|exam| exam.duration_seconds),
    };

    let session = state
        .session_service
        .start_session(user.user_id, exam_id, duration)
        .await?;
    Ok(Json(StartExamResponse {
        success: true,
        start_time: session.start_time,
        duration: session.duration,
    }))
}

#[utoipa::path(
    get,
    path = "/api/exam/{id}/timer",
    params(("id" = i64, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Seconds remaining", body = TimerResponse),
        (status = 404, description = "No session or time is up")
    ),
    security(("bearer" = []))
)]
pub async fn get_timer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let remaining_time = state
        .session_service
        .remaining_time(user.user_id, exam_id)
        .await?;
    Ok(Json(TimerResponse {
        success: true,
        remaining_time,
    }))
}

#[utoipa::path(
    get,
    path = "/api/exam/{id}/result",
    params(("id" = i64, Path, description = "Exam ID")),
    responses((status = 200, description = "Score of final answers", body = ExamResultResponse)),
    security(("bearer" = []))
)]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let questions = state.question_service.questions_for_exam(exam_id).await?;
    let answers = state.answers.find_by_participant(user.user_id).await?;
    Ok(Json(GradingService::score(exam_id, &questions, &answers)))
}
