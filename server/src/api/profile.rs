//! Profile read and update endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::error;

use shared_types::{Network, Region};

use crate::auth::{self, session as sess};
use crate::AppState;

/// GET /api/profile
pub async fn get_profile(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let Some(user_id) = sess::get_user_id(&session).await else {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    };
    match auth::fetch_profile(&state.db, &user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("profile load failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub network: Option<Network>,
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<UpdateProfileBody>,
) -> Response {
    let Some(user_id) = sess::get_user_id(&session).await else {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    };

    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return (StatusCode::BAD_REQUEST, "valid email required").into_response();
    }
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "name must not be empty").into_response();
    }

    let updated = sqlx::query(
        "UPDATE users SET name = ?, email = ?, region = ?, network = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&email)
    .bind(body.region.map(Region::as_str))
    .bind(body.network.map(Network::as_str))
    .bind(Utc::now().timestamp())
    .bind(&user_id)
    .execute(&state.db)
    .await;
    match updated {
        Ok(_) => {}
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            return (StatusCode::CONFLICT, "email already registered").into_response();
        }
        Err(e) => {
            error!("profile update failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    // Keep the session's email copy in sync with the store.
    if let Err(e) = sess::set_user(&session, &user_id, &email).await {
        error!("session refresh after profile update failed: {e}");
    }

    respond_with_profile(&state, &user_id).await
}

#[derive(Deserialize)]
pub struct UpdateAvatarBody {
    pub avatar_url: String,
}

/// PUT /api/profile/avatar
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<UpdateAvatarBody>,
) -> Response {
    let Some(user_id) = sess::get_user_id(&session).await else {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    };

    let url = body.avatar_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return (StatusCode::BAD_REQUEST, "avatar_url must be an http(s) URL").into_response();
    }

    let updated = sqlx::query("UPDATE users SET avatar_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(Utc::now().timestamp())
        .bind(&user_id)
        .execute(&state.db)
        .await;
    if let Err(e) = updated {
        error!("avatar update failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    respond_with_profile(&state, &user_id).await
}

async fn respond_with_profile(state: &AppState, user_id: &str) -> Response {
    match auth::fetch_profile(&state.db, user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("profile reload failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
