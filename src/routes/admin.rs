use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::admin_dto::{
        CreateExamPayload, CreateQuestionPayload, CreateUserPayload, CreatedUserResponse,
        UpdateExamPayload, UpdateQuestionPayload, UpdateUserPayload,
    },
    error::Result,
    routes::extract::ApiJson,
    models::{answer::Answer, exam::Exam, question::AdminQuestion, user::UserView},
    services::auth_service::AuthUser,
    AppState,
};

// ── Questions ──

#[utoipa::path(
    get,
    path = "/api/admin/questions",
    responses((status = 200, description = "All questions with answers", body = [AdminQuestion])),
    security(("bearer" = []))
)]
pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let questions: Vec<AdminQuestion> = state
        .question_service
        .list_questions()
        .await?
        .into_iter()
        .map(AdminQuestion::from)
        .collect();
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/admin/questions/{id}",
    params(("id" = i64, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question", body = AdminQuestion),
        (status = 404, description = "Question not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_question(id).await?;
    Ok(Json(AdminQuestion::from(question)))
}

#[utoipa::path(
    post,
    path = "/api/admin/questions",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created", body = AdminQuestion),
        (status = 400, description = "Invalid payload or unknown exam")
    ),
    security(("bearer" = []))
)]
pub async fn create_question(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.create_question(payload).await?;
    Ok((StatusCode::CREATED, Json(AdminQuestion::from(question))))
}

#[utoipa::path(
    put,
    path = "/api/admin/questions/{id}",
    params(("id" = i64, Path, description = "Question ID")),
    request_body = UpdateQuestionPayload,
    responses(
        (status = 200, description = "Question updated", body = AdminQuestion),
        (status = 404, description = "Question not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.update_question(id, payload).await?;
    Ok(Json(AdminQuestion::from(question)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/questions/{id}",
    params(("id" = i64, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.question_service.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Exams ──

#[utoipa::path(
    post,
    path = "/api/admin/exams",
    request_body = CreateExamPayload,
    responses((status = 201, description = "Exam created", body = Exam)),
    security(("bearer" = []))
)]
pub async fn create_exam(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.duration_seconds > state.config.max_exam_duration_secs {
        return Err(crate::error::Error::BadRequest(format!(
            "duration_seconds must not exceed {}",
            state.config.max_exam_duration_secs
        )));
    }
    let exam = state.exam_service.create_exam(payload).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    get,
    path = "/api/admin/exams/{id}",
    params(("id" = i64, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam", body = Exam),
        (status = 404, description = "Exam not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.exam_service.get_exam(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/exams/{id}",
    params(("id" = i64, Path, description = "Exam ID")),
    request_body = UpdateExamPayload,
    responses(
        (status = 200, description = "Exam updated", body = Exam),
        (status = 404, description = "Exam not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload
        .duration_seconds
        .is_some_and(|d| d > state.config.max_exam_duration_secs)
    {
        return Err(crate::error::Error::BadRequest(format!(
            "duration_seconds must not exceed {}",
            state.config.max_exam_duration_secs
        )));
    }
    Ok(Json(state.exam_service.update_exam(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/exams/{id}",
    params(("id" = i64, Path, description = "Exam ID")),
    responses(
        (status = 204, description = "Exam and its questions deleted"),
        (status = 404, description = "Exam not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.exam_service.delete_exam(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Users ──

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "All users", body = [UserView])),
    security(("bearer" = []))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users: Vec<UserView> = state
        .user_service
        .list()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(UserView::from(state.user_service.get(id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created; temporary_password present when generated", body = CreatedUserResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state
        .user_service
        .create(&payload.email, payload.password.as_deref(), payload.role)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            user: created.user.into(),
            temporary_password: created.temporary_password,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update(id, payload.email, payload.password, payload.role)
        .await?;
    Ok(Json(UserView::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.user_service.delete(admin.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Answers ──

#[utoipa::path(
    get,
    path = "/api/admin/answers",
    responses((status = 200, description = "Every stored answer, drafts included", body = [Answer])),
    security(("bearer" = []))
)]
pub async fn list_answers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.answers.find_all().await?))
}
