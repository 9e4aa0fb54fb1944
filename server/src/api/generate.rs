//! Streaming content generation.
//!
//! The upstream completion API streams SSE; we re-emit just the text
//! fragments as a chunked plain-text body so the client can render the
//! document as it grows. The response status is committed before the
//! upstream finishes, so mid-stream failures surface as an in-band
//! error marker rather than a status code.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error};

use shared_types::{build_prompt, ContentKind};

use crate::sse::{SseParser, SSE_DONE};
use crate::state::CompletionState;
use crate::AppState;

/// Fixed marker appended to the stream when generation fails after the
/// response has been committed. Clients match on it verbatim.
pub const STREAM_ERROR_MARKER: &str = "❌ Erro ao gerar conteúdo.";

#[derive(Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tipo: Option<ContentKind>,
    #[serde(default)]
    pub campos: Option<HashMap<String, String>>,
}

/// POST /api/gerar
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> Response {
    let prompt = match body.prompt {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => match body.tipo {
            Some(tipo) => build_prompt(tipo, &body.campos.unwrap_or_default()),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Prompt ausente" })),
                )
                    .into_response()
            }
        },
    };

    let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
    tokio::spawn(stream_completion(state.completion.clone(), prompt, tx));

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, std::convert::Infallible>(chunk), rx))
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn stream_completion(
    completion: CompletionState,
    prompt: String,
    tx: mpsc::UnboundedSender<Bytes>,
) {
    let url = format!(
        "{}/chat/completions",
        completion.base_url.trim_end_matches('/')
    );
    let mut request = completion.client.post(&url).json(&json!({
        "model": completion.model,
        "stream": true,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": 0.7,
        "max_tokens": 1000,
    }));
    if let Some(key) = completion.api_key.as_deref() {
        request = request.bearer_auth(key);
    }

    let response = match request.send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            error!(status = %response.status(), "completion upstream rejected the request");
            let _ = tx.send(Bytes::from_static(STREAM_ERROR_MARKER.as_bytes()));
            return;
        }
        Err(e) => {
            error!("completion request failed: {e}");
            let _ = tx.send(Bytes::from_static(STREAM_ERROR_MARKER.as_bytes()));
            return;
        }
    };

    let mut parser = SseParser::new();
    let mut upstream = response.bytes_stream();
    while let Some(chunk) = upstream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                error!("completion stream failed mid-flight: {e}");
                let _ = tx.send(Bytes::from_static(STREAM_ERROR_MARKER.as_bytes()));
                return;
            }
        };
        for payload in parser.push(&chunk) {
            if payload == SSE_DONE {
                return;
            }
            let Some(fragment) = extract_delta(&payload) else {
                continue;
            };
            if fragment.is_empty() {
                continue;
            }
            if tx.send(Bytes::from(fragment)).is_err() {
                // Client went away; stop pulling from upstream.
                debug!("generation client disconnected");
                return;
            }
        }
    }
}

/// Pull the text fragment out of one streamed completion chunk.
fn extract_delta(payload: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    value["choices"][0]["delta"]["content"]
        .as_str()
        .map(str::to_owned)
}
