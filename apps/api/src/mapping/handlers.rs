use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::{FormFieldDescriptor, MappedField};
use crate::state::AppState;
use crate::verification::{threshold_met, validate_threshold};

#[derive(Debug, Deserialize)]
pub struct MapFieldsRequest {
    pub fields: Vec<FormFieldDescriptor>,
    /// Defaults to the configured threshold.
    pub confidence_threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MapFieldsResponse {
    pub fields: Vec<MappedField>,
    pub confidence_threshold: f64,
    pub confidence_threshold_met: bool,
}

/// POST /api/v1/fields/map
/// Maps the given descriptors against the stored profile. Nothing is written
/// anywhere; this is a preview of what a form session would fill in.
pub async fn handle_map_fields(
    State(state): State<AppState>,
    Json(req): Json<MapFieldsRequest>,
) -> Result<Json<MapFieldsResponse>, AppError> {
    let threshold = req
        .confidence_threshold
        .unwrap_or(state.config.confidence_threshold);
    validate_threshold(threshold)?;

    let profile = state
        .store
        .load()
        .await?
        .ok_or_else(|| AppError::NotFound("No profile has been extracted yet".to_string()))?;

    let field_count = req.fields.len();
    let fields = state
        .field_mapper()
        .map_all(req.fields, Arc::new(profile))
        .await;
    let met = threshold_met(&fields, threshold);
    info!(fields = field_count, threshold, met, "fields mapped");

    Ok(Json(MapFieldsResponse {
        fields,
        confidence_threshold: threshold,
        confidence_threshold_met: met,
    }))
}
