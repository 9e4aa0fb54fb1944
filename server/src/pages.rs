//! Serves the single-page frontend shell.
//!
//! Every page route returns the same `index.html`; the client router
//! takes over from there. When no built frontend is present (tests,
//! fresh checkouts) a minimal shell is served instead.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};

use crate::AppState;

static PLACEHOLDER_SHELL: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Conecta</title>
</head>
<body>
  <div id="root"></div>
</body>
</html>
"#;

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let path = format!("{}/index.html", state.frontend_dist);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Html(PLACEHOLDER_SHELL).into_response(),
    }
}
