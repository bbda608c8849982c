//! Axum route handlers for the ATS API.
//!
//! The upload checks (format allow-list, size cap) live here, in front of the
//! analyzer, which trusts whatever `Document` it is given.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ats::document::{Document, DocumentFormat};
use crate::ats::metrics::count_words;
use crate::ats::report::ScoreReport;
use crate::errors::AppError;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const PASTED_FILE_NAME: &str = "pasted-text";
const PASTED_MIME: &str = "text/plain";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTextRequest {
    pub text: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub file_name: String,
    pub mime_type: String,
    pub text: String,
    pub word_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScoreReport>, AppError> {
    let document = read_upload(multipart, state.config.max_upload_bytes).await?;
    let report = state.analyzer.analyze(&document).await?;
    Ok(Json(report))
}

/// POST /api/v1/ats/score
pub async fn handle_score_text(
    State(state): State<AppState>,
    Json(req): Json<ScoreTextRequest>,
) -> Result<Json<ScoreReport>, AppError> {
    let file_name = req.file_name.as_deref().unwrap_or(PASTED_FILE_NAME);
    let mime_type = req.mime_type.as_deref().unwrap_or(PASTED_MIME);
    let report = state.analyzer.analyze_text(&req.text, file_name, mime_type)?;
    Ok(Json(report))
}

/// POST /api/v1/ats/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let document = read_upload(multipart, state.config.max_upload_bytes).await?;
    let text = state.analyzer.extract(&document).await?;
    Ok(Json(ExtractResponse {
        file_name: document.file_name,
        mime_type: document.format.mime_type().to_string(),
        word_count: count_words(&text),
        text,
    }))
}

/// Pulls the `file` field out of a multipart body and checks it against the
/// upload allow-list and size cap.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Document, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let format = DocumentFormat::from_mime_type(&content_type)?;

        let content = field.bytes().await.map_err(multipart_error)?;
        if content.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {max_bytes} byte upload limit"
            )));
        }

        debug!(%file_name, format = format.tag(), size = content.len(), "Upload accepted");
        return Ok(Document::new(content, format, file_name));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}
