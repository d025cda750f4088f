use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::dto::admin_dto::TokenQuery;
use crate::error::Error;
use crate::services::auth_service::AuthUser;
use crate::AppState;

fn bearer_token(req: &Request) -> Result<Option<String>, Error> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))?;
    Ok(Some(token.trim().to_string()))
}

fn query_token(req: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

fn authenticate(state: &AppState, token: Option<String>) -> Result<AuthUser, Error> {
    let token = token.ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    state.auth_service.verify_token(&token)
}

/// Resolves the caller from `Authorization: Bearer` and stores [`AuthUser`]
/// in the request extensions.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = match bearer_token(&req).and_then(|t| authenticate(&state, t)) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Like [`require_auth`] but only admins pass. Also accepts `?token=` for
/// download links opened in a new tab.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(Some(t)) => Some(t),
        Ok(None) => query_token(&req),
        Err(e) => return e.into_response(),
    };
    let user = match authenticate(&state, token) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    if !user.is_admin() {
        tracing::warn!(user_id = user.user_id, path = %req.uri().path(), "non-admin hit admin route");
        return Error::Forbidden("forbidden".to_string()).into_response();
    }
    req.extensions_mut().insert(user);
    next.run(req).await
}
