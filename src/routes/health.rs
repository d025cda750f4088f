use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up; reports submission queue depth"))
)]
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "submission_queue": {
            "pending": state.submissions.pending(),
            "capacity": state.submissions.capacity(),
        },
    });
    (StatusCode::OK, Json(body))
}
