//! Session gate applied to the whole router.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::auth::session as sess;
use crate::AppState;

/// Paths reachable without a session: the auth endpoints themselves,
/// the login and signup pages, static assets, and the two generator
/// endpoints (which carry no user data).
fn is_public(path: &str) -> bool {
    path.starts_with("/auth/")
        || path.starts_with("/assets/")
        || path == "/login"
        || path == "/cadastro"
        || path == "/api/gerar"
        || path == "/api/gerar-doc"
}

pub async fn require_auth(
    State(_state): State<Arc<AppState>>,
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if is_public(path) {
        return next.run(req).await;
    }

    if sess::get_user_id(&session).await.is_none() {
        if path.starts_with("/api/") {
            return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
        }
        return Redirect::to("/login").into_response();
    }

    next.run(req).await
}
