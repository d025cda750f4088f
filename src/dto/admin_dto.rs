use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::user::{Role, UserView};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExamPayload {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 second"))]
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateExamPayload {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 second"))]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionPayload {
    #[validate(range(min = 1))]
    pub exam_id: i64,
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "Correct answer cannot be empty"))]
    pub correct_answer: String,
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_weight")]
    pub weight: i32,
}

fn default_weight() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionPayload {
    #[validate(range(min = 1))]
    pub exam_id: Option<i64>,
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: Option<String>,
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Correct answer cannot be empty"))]
    pub correct_answer: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub weight: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Omit to have a temporary password generated.
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedUserResponse {
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// `?token=` fallback for links opened outside the SPA.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}
