//! Conecta backend: auth, profiles, news, the live notes feed and the
//! pedagogical content generator behind one axum router.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docgen;
pub mod feed;
pub mod middleware;
pub mod pages;
pub mod session_store;
pub mod sse;
pub mod state;
pub mod tags;
pub mod timefmt;

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};

pub use state::{AppState, CompletionState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let session_store = session_store::SqliteSessionStore::new(state.db.clone());
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)));

    Router::new()
        // Pages. Every page route serves the SPA shell; the session
        // middleware redirects unauthenticated visits to /login.
        .route("/", get(pages::index))
        .route("/login", get(pages::index))
        .route("/cadastro", get(pages::index))
        .route("/perfil", get(pages::index))
        .route("/noticias", get(pages::index))
        .route("/mensagens", get(pages::index))
        .route("/gerador", get(pages::index))
        .route("/admin", get(pages::index))
        // Auth
        .route("/auth/signup", post(auth::handlers::signup))
        .route("/auth/login", post(auth::handlers::login))
        .route("/auth/logout", post(auth::handlers::logout))
        .route("/auth/password", post(auth::handlers::change_password))
        .route("/auth/me", get(auth::handlers::me))
        // Profile
        .route(
            "/api/profile",
            get(api::profile::get_profile).put(api::profile::update_profile),
        )
        .route("/api/profile/avatar", put(api::profile::update_avatar))
        // News
        .route(
            "/api/noticias",
            get(api::news::list_news).post(api::news::publish_news),
        )
        // Notes feed
        .route(
            "/api/notes",
            get(api::notes::list_notes).post(api::notes::create_note),
        )
        .route("/api/notes/ws", get(feed::notes_websocket))
        .route("/api/notes/{id}", delete(api::notes::delete_note))
        .route("/api/notes/{id}/react", post(api::notes::react_to_note))
        .route(
            "/api/notes/{id}/replies",
            get(api::notes::list_replies).post(api::notes::create_reply),
        )
        // Content generator
        .route("/api/gerar", post(api::generate::generate))
        .route("/api/gerar-doc", post(api::document::generate_document))
        // Admin
        .route("/api/admin/overview", get(api::admin::overview))
        // Built frontend assets
        .nest_service(
            "/assets",
            ServeDir::new(format!("{}/assets", state.frontend_dist)),
        )
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::require_auth,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
