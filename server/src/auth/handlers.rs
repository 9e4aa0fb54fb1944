//! Signup, login, logout, password change and the `/auth/me` probe.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::{error, info, warn};

use shared_types::{new_id, Network, Region, UserProfile};

use crate::auth::{self, session as sess};
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 6;
const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Deserialize)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub network: Option<Network>,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<SignupBody>,
) -> Response {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return (StatusCode::BAD_REQUEST, "valid email required").into_response();
    }
    if body.password.chars().count() < MIN_PASSWORD_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            "password must be at least 6 characters",
        )
            .into_response();
    }

    match fetch_user_id_by_email(&state.db, &email).await {
        Ok(Some(_)) => {
            return (StatusCode::CONFLICT, "email already registered").into_response()
        }
        Ok(None) => {}
        Err(e) => {
            error!("signup email lookup failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let password_hash = match auth::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("password hashing failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let user_id = new_id();
    let name = body.name.trim().to_string();
    let now = Utc::now().timestamp();
    let insert = sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, region, network, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(&name)
    .bind(body.region.map(Region::as_str))
    .bind(body.network.map(Network::as_str))
    .bind(now)
    .execute(&state.db)
    .await;
    if let Err(e) = insert {
        error!("user insert failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if let Err(e) = sess::set_user(&session, &user_id, &email).await {
        error!("session write after signup failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!(email, "user signed up");
    audit(&state.db, Some(&user_id), "signup", None).await;

    match auth::fetch_profile(&state.db, &user_id).await {
        Ok(Some(profile)) => (StatusCode::CREATED, Json(profile)).into_response(),
        _ => StatusCode::CREATED.into_response(),
    }
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Response {
    let email = body.email.trim().to_lowercase();

    let row: Option<(String, String)> =
        match sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&state.db)
            .await
        {
            Ok(row) => row,
            Err(e) => {
                error!("login lookup failed: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    let Some((user_id, password_hash)) = row else {
        // Burn a hash so unknown emails take as long as wrong passwords.
        let _ = auth::hash_password(&body.password);
        warn!(email, "login attempt for unknown email");
        return (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS).into_response();
    };

    if !auth::verify_password(&body.password, &password_hash) {
        warn!(email, "login attempt with wrong password");
        audit(&state.db, Some(&user_id), "login_failed", None).await;
        return (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS).into_response();
    }

    if let Err(e) = sess::set_user(&session, &user_id, &email).await {
        error!("session write after login failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!(email, "login successful");
    audit(&state.db, Some(&user_id), "login", None).await;

    match auth::fetch_profile(&state.db, &user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Err(e) => {
            error!("profile load after login failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let user_id = sess::get_user_id(&session).await;
    if let Err(e) = sess::clear(&session).await {
        error!("session flush on logout failed: {e}");
    }
    audit(&state.db, user_id.as_deref(), "logout", None).await;
    Redirect::to("/login").into_response()
}

#[derive(Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
}

/// GET /auth/me — always 200; the body says whether a session exists.
pub async fn me(State(state): State<Arc<AppState>>, session: Session) -> Json<MeResponse> {
    let user = match sess::get_user_id(&session).await {
        Some(user_id) => auth::fetch_profile(&state.db, &user_id)
            .await
            .ok()
            .flatten(),
        None => None,
    };
    Json(MeResponse {
        authenticated: user.is_some(),
        user,
    })
}

#[derive(Deserialize)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

/// POST /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<ChangePasswordBody>,
) -> Response {
    let Some(user_id) = sess::get_user_id(&session).await else {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    };

    if body.new_password.chars().count() < MIN_PASSWORD_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            "password must be at least 6 characters",
        )
            .into_response();
    }

    let current_hash: Option<String> =
        match sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&state.db)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                error!("password change lookup failed: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
    let Some(current_hash) = current_hash else {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    };

    if !auth::verify_password(&body.current_password, &current_hash) {
        return (StatusCode::UNAUTHORIZED, "current password is wrong").into_response();
    }

    let new_hash = match auth::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("password hashing failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let updated = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(Utc::now().timestamp())
        .bind(&user_id)
        .execute(&state.db)
        .await;
    if let Err(e) = updated {
        error!("password update failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    audit(&state.db, Some(&user_id), "password_change", None).await;
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn fetch_user_id_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Best-effort audit trail; failures are logged, never surfaced.
pub(crate) async fn audit(
    pool: &SqlitePool,
    user_id: Option<&str>,
    event: &str,
    detail: Option<&str>,
) {
    let result = sqlx::query(
        "INSERT INTO audit_log (user_id, event, detail, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(event)
    .bind(detail)
    .bind(Utc::now().timestamp())
    .execute(pool)
    .await;
    if let Err(e) = result {
        warn!("audit write failed: {e}");
    }
}
