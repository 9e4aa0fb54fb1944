//! Export generated content as a `.docx` attachment.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::docgen;

#[derive(Deserialize)]
pub struct GenerateDocBody {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "corpo", default)]
    pub body: String,
}

/// POST /api/gerar-doc
pub async fn generate_document(Json(body): Json<GenerateDocBody>) -> Response {
    let title = body.title.trim();
    let title = if title.is_empty() { "Conteudo" } else { title };

    let bytes = match docgen::render_docx(title, &body.body) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("docx rendering failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let disposition = format!(
        "attachment; filename={}.docx",
        docgen::encode_filename(title)
    );
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
