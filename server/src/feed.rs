//! Live feed fan-out over WebSockets.
//!
//! Handlers that mutate the feed publish a [`FeedEvent`]; every
//! connected socket re-queries the store and pushes a full replacement
//! payload. Clients never diff — they swap the whole list.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tower_sessions::Session;
use tracing::{debug, error};

use shared_types::FeedMessage;

use crate::api::notes::{fetch_notes, fetch_replies};
use crate::auth::session as sess;
use crate::AppState;

#[derive(Debug, Clone)]
pub enum FeedEvent {
    NotesChanged,
    ThreadChanged { note_id: String },
}

#[derive(Clone)]
pub struct FeedHub {
    tx: broadcast::Sender<FeedEvent>,
}

impl FeedHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Best-effort: no subscribers is not an error.
    pub fn publish(&self, event: FeedEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }
}

/// GET /api/notes/ws
pub async fn notes_websocket(
    ws: WebSocketUpgrade,
    session: Session,
    State(state): State<Arc<AppState>>,
) -> Response {
    if sess::get_user_id(&session).await.is_none() {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    ws.on_upgrade(move |socket| handle_feed_socket(socket, state))
        .into_response()
}

async fn handle_feed_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.feed.subscribe();

    // Initial snapshot so a client never renders an empty feed.
    if !send_notes(&state, &mut sender).await {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(FeedEvent::NotesChanged) => {
                    if !send_notes(&state, &mut sender).await {
                        break;
                    }
                }
                Ok(FeedEvent::ThreadChanged { note_id }) => {
                    if !send_thread(&state, &mut sender, &note_id).await {
                        break;
                    }
                }
                // Fell behind the broadcast ring; the full-replacement
                // contract makes resync a plain resend.
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if !send_notes(&state, &mut sender).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            frame = receiver.next() => match frame {
                None | Some(Ok(Message::Close(_))) => break,
                // Clients only listen on this socket.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("feed socket closed with error: {e}");
                    break;
                }
            },
        }
    }
}

async fn send_notes(state: &AppState, sender: &mut SplitSink<WebSocket, Message>) -> bool {
    let notes = match fetch_notes(&state.db).await {
        Ok(notes) => notes,
        Err(e) => {
            error!("feed notes query failed: {e}");
            return false;
        }
    };
    send_json(sender, &FeedMessage::Notes { notes }).await
}

async fn send_thread(
    state: &AppState,
    sender: &mut SplitSink<WebSocket, Message>,
    note_id: &str,
) -> bool {
    let replies = match fetch_replies(&state.db, note_id).await {
        Ok(replies) => replies,
        Err(e) => {
            error!("feed thread query failed: {e}");
            return false;
        }
    };
    send_json(
        sender,
        &FeedMessage::Thread {
            note_id: note_id.to_string(),
            replies,
        },
    )
    .await
}

async fn send_json(sender: &mut SplitSink<WebSocket, Message>, msg: &FeedMessage) -> bool {
    let text = match serde_json::to_string(msg) {
        Ok(text) => text,
        Err(e) => {
            error!("feed payload failed to serialize: {e}");
            return false;
        }
    };
    sender.send(Message::Text(text.into())).await.is_ok()
}
