use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{error::Result, services::export_service::ExportService, AppState};

fn attachment(extension: &str) -> String {
    format!(
        "attachment; filename=\"answers_{}.{}\"",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// All durable answers as CSV.
#[utoipa::path(
    get,
    path = "/api/admin/export",
    params(("token" = Option<String>, Query, description = "Bearer token for links opened without headers")),
    responses(
        (status = 200, description = "CSV export (text/csv)", body = String),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer" = []))
)]
pub async fn export_answers_csv(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let answers = state.answers.find_all().await?;
    let body = ExportService::answers_csv(&answers);
    tracing::info!(rows = answers.len(), "answers exported as csv");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment("csv")),
        ],
        body,
    ))
}

/// Same rows as the CSV export, as a styled workbook.
#[utoipa::path(
    get,
    path = "/api/admin/export/xlsx",
    params(("token" = Option<String>, Query, description = "Bearer token for links opened without headers")),
    responses(
        (status = 200, description = "XLSX workbook"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer" = []))
)]
pub async fn export_answers_xlsx(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let answers = state.answers.find_all().await?;
    let buffer = ExportService::answers_xlsx(&answers)?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, attachment("xlsx")),
        ],
        buffer,
    ))
}
