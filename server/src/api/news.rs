//! Announcements: anyone signed in reads, only the admin publishes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::error;

use shared_types::{new_id, NewsItem};

use crate::api::require_admin;
use crate::auth::handlers::audit;
use crate::AppState;

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: String,
    title: String,
    body: String,
    published_at: i64,
}

impl NewsRow {
    fn into_item(self) -> NewsItem {
        NewsItem {
            id: self.id,
            title: self.title,
            body: self.body,
            published_at: DateTime::from_timestamp(self.published_at, 0).unwrap_or_default(),
        }
    }
}

/// GET /api/noticias — newest first.
pub async fn list_news(State(state): State<Arc<AppState>>) -> Response {
    let rows: Result<Vec<NewsRow>, _> = sqlx::query_as(
        "SELECT id, title, body, published_at FROM news ORDER BY published_at DESC, rowid DESC",
    )
    .fetch_all(&state.db)
    .await;
    match rows {
        Ok(rows) => {
            let items: Vec<NewsItem> = rows.into_iter().map(NewsRow::into_item).collect();
            Json(items).into_response()
        }
        Err(e) => {
            error!("news query failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct PublishNewsBody {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "corpo")]
    pub body: String,
}

/// POST /api/noticias — admin only.
pub async fn publish_news(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<PublishNewsBody>,
) -> Response {
    let admin = match require_admin(&state, &session).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    let title = body.title.trim().to_string();
    let text = body.body.trim().to_string();
    if title.is_empty() || text.is_empty() {
        return (StatusCode::BAD_REQUEST, "title and body required").into_response();
    }

    let item = NewsItem {
        id: new_id(),
        title,
        body: text,
        published_at: Utc::now(),
    };
    let inserted = sqlx::query("INSERT INTO news (id, title, body, published_at) VALUES (?, ?, ?, ?)")
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.body)
        .bind(item.published_at.timestamp())
        .execute(&state.db)
        .await;
    if let Err(e) = inserted {
        error!("news insert failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    audit(&state.db, Some(&admin.id), "news_publish", Some(&item.title)).await;
    (StatusCode::CREATED, Json(item)).into_response()
}
