//! The notes feed: create, list, react, reply, delete.
//!
//! Reactions are membership rows keyed `(note_id, user_id, kind)`;
//! counts are derived by aggregation, so concurrent reactions can
//! never clobber each other and repeats are idempotent no-ops.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{error, warn};

use shared_types::{new_id, Note, ReactionKind, ReactionState, Reply, UserProfile};

use crate::auth::{self, session as sess};
use crate::feed::FeedEvent;
use crate::tags::parse_tags;
use crate::timefmt::time_ago;
use crate::AppState;

/// Hard cap on note and reply bodies, in characters.
pub const MAX_BODY_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("body must not be empty")]
    EmptyBody,
    #[error("body exceeds {MAX_BODY_CHARS} characters")]
    BodyTooLong,
    #[error("note not found")]
    NotFound,
    #[error("only the author can delete a note")]
    NotAuthor,
    #[error("authors cannot react to their own note")]
    SelfReaction,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let status = match &self {
            NoteError::Unauthenticated => StatusCode::UNAUTHORIZED,
            NoteError::EmptyBody | NoteError::BodyTooLong => StatusCode::BAD_REQUEST,
            NoteError::NotFound => StatusCode::NOT_FOUND,
            NoteError::NotAuthor => StatusCode::FORBIDDEN,
            NoteError::SelfReaction => StatusCode::CONFLICT,
            NoteError::Db(e) => {
                error!("notes store error: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Deserialize)]
pub struct CreateNoteBody {
    pub body: String,
    #[serde(default)]
    pub tags: Option<String>,
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<CreateNoteBody>,
) -> Result<Response, NoteError> {
    let author = require_user(&state, &session).await?;
    let text = validate_body(&body.body)?;

    let note_id = new_id();
    let tags = serde_json::to_string(&parse_tags(body.tags.as_deref().unwrap_or("")))
        .unwrap_or_else(|_| "[]".into());
    sqlx::query(
        "INSERT INTO notes (id, author_id, author_name, author_avatar_url, body, tags, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&note_id)
    .bind(&author.id)
    .bind(author.display_label())
    .bind(&author.avatar_url)
    .bind(text)
    .bind(&tags)
    .bind(Utc::now().timestamp())
    .execute(&state.db)
    .await?;

    state.feed.publish(FeedEvent::NotesChanged);

    let note = fetch_note(&state.db, &note_id)
        .await?
        .ok_or(NoteError::NotFound)?;
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

/// GET /api/notes — newest first.
pub async fn list_notes(State(state): State<Arc<AppState>>) -> Result<Response, NoteError> {
    let notes = fetch_notes(&state.db).await?;
    Ok(Json(notes).into_response())
}

#[derive(Deserialize)]
pub struct ReactBody {
    pub emoji: ReactionKind,
}

/// POST /api/notes/{id}/react
pub async fn react_to_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(note_id): Path<String>,
    Json(body): Json<ReactBody>,
) -> Result<Response, NoteError> {
    let user = require_user(&state, &session).await?;

    let author_id: Option<String> = sqlx::query_scalar("SELECT author_id FROM notes WHERE id = ?")
        .bind(&note_id)
        .fetch_optional(&state.db)
        .await?;
    let Some(author_id) = author_id else {
        return Err(NoteError::NotFound);
    };
    if author_id == user.id {
        return Err(NoteError::SelfReaction);
    }

    // Single atomic statement; the composite primary key makes a repeat
    // from the same user a no-op.
    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO reactions (note_id, user_id, kind, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&note_id)
    .bind(&user.id)
    .bind(body.emoji.as_str())
    .bind(Utc::now().timestamp())
    .execute(&state.db)
    .await?
    .rows_affected();

    if inserted > 0 {
        state.feed.publish(FeedEvent::NotesChanged);
    }

    let note = fetch_note(&state.db, &note_id)
        .await?
        .ok_or(NoteError::NotFound)?;
    Ok(Json(note).into_response())
}

#[derive(Deserialize)]
pub struct CreateReplyBody {
    pub body: String,
}

/// POST /api/notes/{id}/replies
pub async fn create_reply(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(note_id): Path<String>,
    Json(body): Json<CreateReplyBody>,
) -> Result<Response, NoteError> {
    let author = require_user(&state, &session).await?;
    let text = validate_body(&body.body)?;
    ensure_note_exists(&state.db, &note_id).await?;

    let reply_id = new_id();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO replies (id, note_id, author_id, author_name, author_avatar_url, body, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&reply_id)
    .bind(&note_id)
    .bind(&author.id)
    .bind(author.display_label())
    .bind(&author.avatar_url)
    .bind(text)
    .bind(now.timestamp())
    .execute(&state.db)
    .await?;

    state.feed.publish(FeedEvent::ThreadChanged {
        note_id: note_id.clone(),
    });

    let created_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or_default();
    let reply = Reply {
        id: reply_id,
        note_id,
        author_id: author.id.clone(),
        author_name: author.display_label().to_string(),
        author_avatar_url: author.avatar_url.clone(),
        body: text.to_string(),
        created_at,
        time_ago: time_ago(created_at, now),
    };
    Ok((StatusCode::CREATED, Json(reply)).into_response())
}

/// GET /api/notes/{id}/replies — oldest first.
pub async fn list_replies(
    State(state): State<Arc<AppState>>,
    Path(note_id): Path<String>,
) -> Result<Response, NoteError> {
    ensure_note_exists(&state.db, &note_id).await?;
    let replies = fetch_replies(&state.db, &note_id).await?;
    Ok(Json(replies).into_response())
}

/// DELETE /api/notes/{id} — author only; replies and reactions go with
/// the note via foreign-key cascade.
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(note_id): Path<String>,
) -> Result<Response, NoteError> {
    let user = require_user(&state, &session).await?;

    let author_id: Option<String> = sqlx::query_scalar("SELECT author_id FROM notes WHERE id = ?")
        .bind(&note_id)
        .fetch_optional(&state.db)
        .await?;
    let Some(author_id) = author_id else {
        return Err(NoteError::NotFound);
    };
    if author_id != user.id {
        return Err(NoteError::NotAuthor);
    }

    sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(&note_id)
        .execute(&state.db)
        .await?;

    state.feed.publish(FeedEvent::NotesChanged);
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ---------------------------------------------------------------------------
// Store helpers (shared with the WebSocket fan-out)
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: String,
    author_id: String,
    author_name: String,
    author_avatar_url: Option<String>,
    body: String,
    tags: String,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: String,
    note_id: String,
    author_id: String,
    author_name: String,
    author_avatar_url: Option<String>,
    body: String,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct ReactionRow {
    note_id: String,
    user_id: String,
    kind: String,
}

pub async fn fetch_notes(pool: &SqlitePool) -> Result<Vec<Note>, sqlx::Error> {
    let rows: Vec<NoteRow> = sqlx::query_as(
        "SELECT id, author_id, author_name, author_avatar_url, body, tags, created_at
         FROM notes ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    let reactions: Vec<ReactionRow> =
        sqlx::query_as("SELECT note_id, user_id, kind FROM reactions ORDER BY created_at, user_id")
            .fetch_all(pool)
            .await?;

    let mut by_note: HashMap<String, BTreeMap<ReactionKind, ReactionState>> = HashMap::new();
    for row in reactions {
        let Some(kind) = ReactionKind::from_db(&row.kind) else {
            warn!(kind = %row.kind, "unknown reaction kind in store");
            continue;
        };
        let entry = by_note
            .entry(row.note_id)
            .or_default()
            .entry(kind)
            .or_default();
        entry.count += 1;
        entry.reacted_by.push(row.user_id);
    }

    let now = Utc::now();
    Ok(rows
        .into_iter()
        .map(|row| {
            let reactions = by_note.remove(&row.id).unwrap_or_default();
            assemble_note(row, reactions, now)
        })
        .collect())
}

pub async fn fetch_note(pool: &SqlitePool, note_id: &str) -> Result<Option<Note>, sqlx::Error> {
    let row: Option<NoteRow> = sqlx::query_as(
        "SELECT id, author_id, author_name, author_avatar_url, body, tags, created_at
         FROM notes WHERE id = ?",
    )
    .bind(note_id)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let reaction_rows: Vec<ReactionRow> = sqlx::query_as(
        "SELECT note_id, user_id, kind FROM reactions WHERE note_id = ? ORDER BY created_at, user_id",
    )
    .bind(note_id)
    .fetch_all(pool)
    .await?;

    let mut reactions: BTreeMap<ReactionKind, ReactionState> = BTreeMap::new();
    for r in reaction_rows {
        let Some(kind) = ReactionKind::from_db(&r.kind) else {
            warn!(kind = %r.kind, "unknown reaction kind in store");
            continue;
        };
        let entry = reactions.entry(kind).or_default();
        entry.count += 1;
        entry.reacted_by.push(r.user_id);
    }

    Ok(Some(assemble_note(row, reactions, Utc::now())))
}

pub async fn fetch_replies(pool: &SqlitePool, note_id: &str) -> Result<Vec<Reply>, sqlx::Error> {
    let rows: Vec<ReplyRow> = sqlx::query_as(
        "SELECT id, note_id, author_id, author_name, author_avatar_url, body, created_at
         FROM replies WHERE note_id = ? ORDER BY created_at, rowid",
    )
    .bind(note_id)
    .fetch_all(pool)
    .await?;

    let now = Utc::now();
    Ok(rows
        .into_iter()
        .map(|row| {
            let created_at = DateTime::from_timestamp(row.created_at, 0).unwrap_or_default();
            Reply {
                id: row.id,
                note_id: row.note_id,
                author_id: row.author_id,
                author_name: row.author_name,
                author_avatar_url: row.author_avatar_url,
                body: row.body,
                created_at,
                time_ago: time_ago(created_at, now),
            }
        })
        .collect())
}

fn assemble_note(
    row: NoteRow,
    mut reactions: BTreeMap<ReactionKind, ReactionState>,
    now: DateTime<Utc>,
) -> Note {
    // All four symbols are always present, zero-initialized.
    for kind in ReactionKind::ALL {
        reactions.entry(kind).or_default();
    }
    let created_at = DateTime::from_timestamp(row.created_at, 0).unwrap_or_default();
    Note {
        id: row.id,
        author_id: row.author_id,
        author_name: row.author_name,
        author_avatar_url: row.author_avatar_url,
        body: row.body,
        tags: serde_json::from_str(&row.tags).unwrap_or_default(),
        created_at,
        time_ago: time_ago(created_at, now),
        reactions,
    }
}

fn validate_body(raw: &str) -> Result<&str, NoteError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(NoteError::EmptyBody);
    }
    if text.chars().count() > MAX_BODY_CHARS {
        return Err(NoteError::BodyTooLong);
    }
    Ok(text)
}

async fn ensure_note_exists(pool: &SqlitePool, note_id: &str) -> Result<(), NoteError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM notes WHERE id = ?")
        .bind(note_id)
        .fetch_optional(pool)
        .await?;
    if found.is_none() {
        return Err(NoteError::NotFound);
    }
    Ok(())
}

async fn require_user(state: &AppState, session: &Session) -> Result<UserProfile, NoteError> {
    let Some(user_id) = sess::get_user_id(session).await else {
        return Err(NoteError::Unauthenticated);
    };
    auth::fetch_profile(&state.db, &user_id)
        .await?
        .ok_or(NoteError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_validation_trims_and_caps() {
        assert!(matches!(validate_body("   "), Err(NoteError::EmptyBody)));
        assert_eq!(validate_body("  olá  ").unwrap(), "olá");
        let long = "á".repeat(MAX_BODY_CHARS + 1);
        assert!(matches!(validate_body(&long), Err(NoteError::BodyTooLong)));
        let max = "á".repeat(MAX_BODY_CHARS);
        assert!(validate_body(&max).is_ok());
    }
}
