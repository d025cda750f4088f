pub mod admin;
pub mod answers;
pub mod auth;
pub mod exam;
pub mod export;
pub mod extract;
pub mod health;
pub mod openapi;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn_with_state, map_response},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::{require_admin, require_auth},
    rate_limit::auth_rate_limit,
};
use crate::AppState;

const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Full HTTP surface. Participant routes need a bearer token, admin routes an
/// admin token, register/login are rate limited per client address.
pub fn build_router(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi::openapi_json))
        .route("/api/exams", get(exam::list_exams));

    let auth_api = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .layer(from_fn_with_state(state.clone(), auth_rate_limit));

    let participant_api = Router::new()
        .route("/api/exam/:id/questions", get(exam::get_questions))
        .route("/api/exam/:id/start", post(exam::start_exam))
        .route("/api/exam/:id/timer", get(exam::get_timer))
        .route("/api/exam/:id/result", get(exam::get_result))
        .route("/api/answers/draft", post(answers::save_draft))
        .route("/api/answers/draft/:question_id", get(answers::get_draft))
        .route("/api/answers/submit", post(answers::submit_answers))
        .route("/api/answers/submissions/:id", get(answers::submission_status))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let admin_api = Router::new()
        .route(
            "/api/admin/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/api/admin/questions/:id",
            get(admin::get_question)
                .put(admin::update_question)
                .delete(admin::delete_question),
        )
        .route("/api/admin/exams", post(admin::create_exam))
        .route(
            "/api/admin/exams/:id",
            get(admin::get_exam)
                .put(admin::update_exam)
                .delete(admin::delete_exam),
        )
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/api/admin/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/api/admin/answers", get(admin::list_answers))
        .route("/api/admin/export", get(export::export_answers_csv))
        .route("/api/admin/export/xlsx", get(export::export_answers_xlsx))
        .layer(from_fn_with_state(state.clone(), require_admin));

    base_routes
        .merge(auth_api)
        .merge(participant_api)
        .merge(admin_api)
        .with_state(state)
        .layer(map_response(no_store))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// Timer and draft reads must never be served from an intermediary cache.
async fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-store"),
    );
    response
}
