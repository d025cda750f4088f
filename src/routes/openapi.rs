use axum::response::{IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto::{
    admin_dto::{
        CreateExamPayload, CreateQuestionPayload, CreateUserPayload, CreatedUserResponse,
        UpdateExamPayload, UpdateQuestionPayload, UpdateUserPayload,
    },
    answer_dto::{DraftResponse, SaveDraftRequest, SubmitAnswerItem, SubmitResponse},
    auth_dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    exam_dto::{ExamResultResponse, StartExamRequest, StartExamResponse, TimerResponse},
    SuccessResponse,
};
use crate::models::{
    answer::Answer,
    exam::Exam,
    question::{AdminQuestion, PublicQuestion},
    submission::{FailedItem, SubmissionState, SubmissionStatus},
    user::{Role, UserView},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health::health,
        super::auth::register,
        super::auth::login,
        super::exam::list_exams,
        super::exam::get_questions,
        super::exam::start_exam,
        super::exam::get_timer,
        super::exam::get_result,
        super::answers::save_draft,
        super::answers::get_draft,
        super::answers::submit_answers,
        super::answers::submission_status,
        super::admin::list_questions,
        super::admin::get_question,
        super::admin::create_question,
        super::admin::update_question,
        super::admin::delete_question,
        super::admin::create_exam,
        super::admin::get_exam,
        super::admin::update_exam,
        super::admin::delete_exam,
        super::admin::list_users,
        super::admin::get_user,
        super::admin::create_user,
        super::admin::update_user,
        super::admin::delete_user,
        super::admin::list_answers,
        super::export::export_answers_csv,
        super::export::export_answers_xlsx,
    ),
    components(schemas(
        SuccessResponse,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        StartExamRequest,
        StartExamResponse,
        TimerResponse,
        ExamResultResponse,
        SaveDraftRequest,
        DraftResponse,
        SubmitAnswerItem,
        SubmitResponse,
        SubmissionStatus,
        SubmissionState,
        FailedItem,
        CreateExamPayload,
        UpdateExamPayload,
        CreateQuestionPayload,
        UpdateQuestionPayload,
        CreateUserPayload,
        UpdateUserPayload,
        CreatedUserResponse,
        Exam,
        PublicQuestion,
        AdminQuestion,
        Answer,
        Role,
        UserView,
    )),
    modifiers(&BearerAuth),
    tags((name = "exam-backend", description = "Online exam sessions, answers and administration"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/exam/{id}/start",
            "/api/exam/{id}/timer",
            "/api/answers/draft",
            "/api/answers/submit",
            "/api/admin/export",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
