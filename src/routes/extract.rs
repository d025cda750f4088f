use axum::extract::FromRequest;

use crate::error::Error;

/// `Json` whose rejections render through [`Error`], so malformed bodies get
/// the same `{"error": ...}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
