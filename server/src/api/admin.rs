//! Admin dashboard: the full member roster with tallies.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tower_sessions::Session;
use tracing::error;

use shared_types::UserProfile;

use crate::api::require_admin;
use crate::auth;
use crate::AppState;

#[derive(Serialize)]
pub struct AdminOverview {
    pub total: usize,
    /// User counts keyed by UF code, only for users who set one.
    pub by_region: BTreeMap<String, i64>,
    pub by_network: BTreeMap<String, i64>,
    pub users: Vec<UserProfile>,
}

/// GET /api/admin/overview
pub async fn overview(State(state): State<Arc<AppState>>, session: Session) -> Response {
    if let Err(response) = require_admin(&state, &session).await {
        return response;
    }

    let users = match auth::fetch_all_profiles(&state.db).await {
        Ok(users) => users,
        Err(e) => {
            error!("roster query failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut by_region: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_network: BTreeMap<String, i64> = BTreeMap::new();
    for user in &users {
        if let Some(region) = user.region {
            *by_region.entry(region.as_str().to_string()).or_default() += 1;
        }
        if let Some(network) = user.network {
            *by_network.entry(network.as_str().to_string()).or_default() += 1;
        }
    }

    Json(AdminOverview {
        total: users.len(),
        by_region,
        by_network,
        users,
    })
    .into_response()
}
