pub mod auth_service;
pub mod exam_service;
pub mod exam_session_service;
pub mod export_service;
pub mod grading_service;
pub mod question_service;
pub mod submission_service;
pub mod user_service;
