use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::document::RawDocumentText;
use crate::extraction::pipeline::{extract_profile, ExtractionReport};
use crate::models::CandidateProfile;
use crate::state::AppState;

/// Exactly one of `raw_text` or `pages`.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: Option<String>,
    pub pages: Option<Vec<String>>,
}

async fn extract_and_store(
    state: &AppState,
    document: RawDocumentText,
) -> Result<Json<ExtractionReport>, AppError> {
    let report = extract_profile(&state.extraction_context(), &document).await?;
    state.store.save(&report.profile).await?;
    Ok(Json(report))
}

/// POST /api/v1/profile/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractionReport>, AppError> {
    let document = match (req.raw_text, req.pages) {
        (Some(text), None) => RawDocumentText::from_text(text),
        (None, Some(pages)) => RawDocumentText { pages },
        _ => {
            return Err(AppError::Validation(
                "Provide exactly one of 'raw_text' or 'pages'".to_string(),
            ))
        }
    };
    extract_and_store(&state, document).await
}

/// POST /api/v1/profile/upload
/// Multipart body with the PDF export in a `file` part.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionReport>, AppError> {
    let mut file: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read 'file': {e}")))?;
            file = Some(bytes);
        }
    }

    let bytes = file.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    let document = state.documents.extract(bytes).await?;
    extract_and_store(&state, document).await
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
) -> Result<Json<CandidateProfile>, AppError> {
    let profile = state
        .store
        .load()
        .await?
        .ok_or_else(|| AppError::NotFound("No profile has been extracted yet".to_string()))?;
    Ok(Json(profile))
}
