//! Shared plumbing for router-level integration tests: an app backed
//! by an in-memory database, plus request/response helpers.

// Each test binary compiles this module; not all of them use every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use server::feed::FeedHub;
use server::{db, AppState, CompletionState};

pub const TEST_ADMIN_EMAIL: &str = "admin@conecta.test";

/// The completion base URL points at a port nothing listens on, so
/// generation exercises the error path deterministically.
pub async fn test_app() -> Router {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    let state = Arc::new(AppState {
        db: pool,
        feed: FeedHub::new(16),
        completion: CompletionState {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .expect("reqwest client"),
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            model: "test-model".to_string(),
        },
        admin_email: TEST_ADMIN_EMAIL.to_string(),
        frontend_dist: "./no-such-dist".to_string(),
    });
    server::build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("infallible")
}

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// The session cookie pair (`name=value`) from a response that touched
/// the session.
pub fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should carry a session cookie")
        .to_str()
        .expect("cookie is ascii")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_string(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// Sign a user up and return `(session cookie, user id)`.
pub async fn signup(app: &Router, name: &str, email: &str) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/signup",
            json!({ "name": name, "email": email, "password": "senha123" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let cookie = session_cookie(&response);
    let profile = body_json(response).await;
    let user_id = profile["id"].as_str().expect("profile id").to_string();
    (cookie, user_id)
}
