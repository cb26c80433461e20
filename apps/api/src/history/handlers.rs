use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ApplicationRecord, ApplicationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// RFC 3339; inclusive.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// GET /api/v1/applications?start=...&end=...
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    if let (Some(start), Some(end)) = (params.start, params.end) {
        if end < start {
            return Err(AppError::Validation(
                "'end' must not be before 'start'".to_string(),
            ));
        }
    }
    let records = state.applications.applications(params.start, params.end).await?;
    Ok(Json(records))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let status: ApplicationStatus = req.status.parse()?;
    let record = state
        .applications
        .update_application_status(id, status)
        .await?;
    Ok(Json(record))
}
