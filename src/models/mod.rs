pub mod answer;
pub mod exam;
pub mod exam_session;
pub mod question;
pub mod submission;
pub mod user;
