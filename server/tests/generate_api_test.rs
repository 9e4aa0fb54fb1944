//! The streaming generator endpoint. The test app points the upstream
//! at a closed port, so these exercise request validation and the
//! in-band error marker.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

const ERROR_MARKER: &str = "❌ Erro ao gerar conteúdo.";

#[tokio::test]
async fn missing_prompt_is_a_bad_request() {
    let app = test_app().await;

    let response = send(&app, json_request("POST", "/api/gerar", json!({}), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Prompt ausente");

    // A blank prompt with no template counts as missing too.
    let response = send(
        &app,
        json_request("POST", "/api/gerar", json!({ "prompt": "   " }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_surfaces_as_in_band_marker() {
    let app = test_app().await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/gerar",
            json!({ "prompt": "Explique frações" }),
            None,
        ),
    )
    .await;
    // The status is committed before the upstream is reached.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, ERROR_MARKER);
}

#[tokio::test]
async fn template_requests_build_the_prompt_server_side() {
    let app = test_app().await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/gerar",
            json!({
                "tipo": "Plano de Aula",
                "campos": { "tema": "Frações", "disciplina": "Matemática" }
            }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, ERROR_MARKER);
}

#[tokio::test]
async fn unknown_template_is_rejected() {
    let app = test_app().await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/gerar",
            json!({ "tipo": "Prova Surpresa", "campos": {} }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn generator_only_accepts_post() {
    let app = test_app().await;
    let response = send(&app, get_request("/api/gerar", None)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
