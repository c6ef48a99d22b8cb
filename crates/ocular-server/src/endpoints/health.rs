use axum::Json;
use axum::extract::State;
use ocular_core::ClassLabel;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model: Option<String>,
    pub threshold: f32,
    pub labels: Vec<ClassLabel>,
}

/// `GET /health`
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let adapter = state.diagnoser.adapter();
    Json(HealthResponse {
        status: "ok",
        model_loaded: adapter.is_available(),
        model: adapter.model_name().map(str::to_owned),
        threshold: state.config.threshold,
        labels: state.config.labels.as_slice().to_vec(),
    })
}
