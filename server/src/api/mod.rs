//! JSON API handlers.

pub mod admin;
pub mod document;
pub mod generate;
pub mod news;
pub mod notes;
pub mod profile;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;
use tracing::error;

use shared_types::UserProfile;

use crate::auth::{self, session as sess};
use crate::AppState;

/// Gate for admin-only endpoints. Admin is whoever owns the configured
/// admin email, checked against the stored profile rather than the
/// session so demotion takes effect immediately.
pub(crate) async fn require_admin(
    state: &AppState,
    session: &Session,
) -> Result<UserProfile, Response> {
    let Some(user_id) = sess::get_user_id(session).await else {
        return Err((StatusCode::UNAUTHORIZED, "not authenticated").into_response());
    };
    match auth::fetch_profile(&state.db, &user_id).await {
        Ok(Some(profile)) if profile.email == state.admin_email => Ok(profile),
        Ok(Some(_)) => Err((StatusCode::FORBIDDEN, "admin only").into_response()),
        Ok(None) => Err((StatusCode::UNAUTHORIZED, "not authenticated").into_response()),
        Err(e) => {
            error!("admin profile lookup failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}
