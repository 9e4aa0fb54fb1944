//! End-to-end exercise of the notes feed over the real router.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn feed_lifecycle_create_react_reply_delete() {
    let app = test_app().await;
    let (ana, _ana_id) = signup(&app, "Ana", "ana@escola.br").await;
    let (bruno, bruno_id) = signup(&app, "Bruno", "bruno@escola.br").await;

    // Ana posts a note.
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/notes",
            json!({ "body": "Alguém tem material sobre frações?", "tags": "#Matemática, ENEM" }),
            Some(&ana),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await;
    let note_id = note["id"].as_str().unwrap().to_string();
    assert_eq!(note["author_name"], "Ana");
    assert_eq!(note["tags"], json!(["matemática", "enem"]));
    // All four symbols present, zeroed.
    assert_eq!(note["reactions"]["👍"]["count"], 0);
    assert_eq!(note["reactions"]["❤️"]["count"], 0);
    assert_eq!(note["reactions"]["💡"]["count"], 0);
    assert_eq!(note["reactions"]["🎉"]["count"], 0);

    // Bruno reacts; the same reaction twice stays at one.
    for _ in 0..2 {
        let response = send(
            &app,
            json_request(
                "POST",
                &format!("/api/notes/{note_id}/react"),
                json!({ "emoji": "👍" }),
                Some(&bruno),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let note = body_json(response).await;
        assert_eq!(note["reactions"]["👍"]["count"], 1);
        assert_eq!(
            note["reactions"]["👍"]["reacted_by"],
            json!([bruno_id.as_str()])
        );
    }

    // Ana cannot react to her own note.
    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/notes/{note_id}/react"),
            json!({ "emoji": "❤️" }),
            Some(&ana),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Bruno replies; the thread lists it oldest-first.
    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/notes/{note_id}/replies"),
            json!({ "body": "Tenho sim, te mando!" }),
            Some(&bruno),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        get_request(&format!("/api/notes/{note_id}/replies"), Some(&ana)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let replies = body_json(response).await;
    assert_eq!(replies.as_array().unwrap().len(), 1);
    assert_eq!(replies[0]["author_name"], "Bruno");

    // Only the author can delete.
    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/notes/{note_id}"))
        .header(axum::http::header::COOKIE, &bruno)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/notes/{note_id}"))
        .header(axum::http::header::COOKIE, &ana)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone, and the thread went with it.
    let response = send(&app, get_request("/api/notes", Some(&ana))).await;
    let notes = body_json(response).await;
    assert_eq!(notes.as_array().unwrap().len(), 0);
    let response = send(
        &app,
        get_request(&format!("/api/notes/{note_id}/replies"), Some(&ana)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_are_listed_newest_first() {
    let app = test_app().await;
    let (ana, _) = signup(&app, "Ana", "ana@escola.br").await;

    for body in ["primeira", "segunda"] {
        let response = send(
            &app,
            json_request("POST", "/api/notes", json!({ "body": body }), Some(&ana)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, get_request("/api/notes", Some(&ana))).await;
    let notes = body_json(response).await;
    let bodies: Vec<&str> = notes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["segunda", "primeira"]);
}

#[tokio::test]
async fn note_body_is_validated() {
    let app = test_app().await;
    let (ana, _) = signup(&app, "Ana", "ana@escola.br").await;

    let response = send(
        &app,
        json_request("POST", "/api/notes", json!({ "body": "   " }), Some(&ana)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long = "x".repeat(401);
    let response = send(
        &app,
        json_request("POST", "/api/notes", json!({ "body": long }), Some(&ana)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reacting_to_a_missing_note_is_404() {
    let app = test_app().await;
    let (ana, _) = signup(&app, "Ana", "ana@escola.br").await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/notes/no-such-note/react",
            json!({ "emoji": "🎉" }),
            Some(&ana),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_requires_a_session() {
    let app = test_app().await;

    let response = send(&app, get_request("/api/notes", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        json_request("POST", "/api/notes", json!({ "body": "oi" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
