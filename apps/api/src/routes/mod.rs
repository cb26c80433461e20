pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::extraction::handlers as profile;
use crate::history::handlers as history;
use crate::mapping::handlers as fields;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API
        .route("/api/v1/profile", get(profile::handle_get_profile))
        .route("/api/v1/profile/extract", post(profile::handle_extract))
        .route("/api/v1/profile/upload", post(profile::handle_upload))
        // Field mapping API
        .route("/api/v1/fields/map", post(fields::handle_map_fields))
        // Application history API
        .route("/api/v1/applications", get(history::handle_list_applications))
        .route(
            "/api/v1/applications/:id/status",
            patch(history::handle_update_status),
        )
        .with_state(state)
}
