//! Read-only disease reference routes.

use axum::Json;
use axum::extract::{Path, State};
use ocular_core::{DiseaseInfo, disease_info, find_disease};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /diseases`: every entry, in the configured label order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<&'static DiseaseInfo>> {
    Json(state.config.labels.iter().map(disease_info).collect())
}

/// `GET /diseases/:name`: one entry by display name or slug.
pub async fn detail(Path(name): Path<String>) -> Result<Json<&'static DiseaseInfo>, ApiError> {
    find_disease(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown disease: {name}")))
}
