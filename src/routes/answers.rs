use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        answer_dto::{DraftResponse, SaveDraftRequest, SubmitAnswerItem, SubmitResponse},
        SuccessResponse,
    },
    error::Result,
    routes::extract::ApiJson,
    models::submission::SubmissionStatus,
    services::{auth_service::AuthUser, submission_service::FinalAnswer},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/answers/draft",
    request_body = SaveDraftRequest,
    responses(
        (status = 200, description = "Draft saved", body = SuccessResponse),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<SaveDraftRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .session_service
        .save_draft(user.user_id, payload.question_id, payload.answer_text)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/answers/draft/{question_id}",
    params(("question_id" = i64, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Latest draft", body = DraftResponse),
        (status = 404, description = "No draft saved or draft expired")
    ),
    security(("bearer" = []))
)]
pub async fn get_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let draft = state.session_service.get_draft(user.user_id, question_id).await?;
    Ok(Json(DraftResponse {
        success: true,
        question_id: draft.question_id,
        answer_text: draft.answer_text,
        updated_at: draft.updated_at,
    }))
}

#[utoipa::path(
    post,
    path = "/api/answers/submit",
    request_body = [SubmitAnswerItem],
    responses(
        (status = 202, description = "Accepted for background persistence", body = SubmitResponse),
        (status = 400, description = "Invalid payload"),
        (status = 503, description = "Submission queue full")
    ),
    security(("bearer" = []))
)]
pub async fn submit_answers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<Vec<SubmitAnswerItem>>,
) -> Result<impl IntoResponse> {
    for item in &payload {
        item.validate()?;
    }
    let items: Vec<FinalAnswer> = payload.into_iter().map(FinalAnswer::from).collect();
    let status = state.submissions.submit(user.user_id, items).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            success: true,
            submission_id: status.id,
            status: status.state,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/answers/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission progress", body = SubmissionStatus),
        (status = 404, description = "Unknown or expired submission")
    ),
    security(("bearer" = []))
)]
pub async fn submission_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let status = state.submissions.status(user.user_id, id).await?;
    Ok(Json(status))
}
