use sqlx::SqlitePool;

use crate::feed::FeedHub;

/// Everything needed to call the completion upstream.
#[derive(Clone)]
pub struct CompletionState {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

pub struct AppState {
    pub db: SqlitePool,
    pub feed: FeedHub,
    pub completion: CompletionState,
    pub admin_email: String,
    pub frontend_dist: String,
}
