//! `POST /predict`: multipart fundus upload → diagnosis.

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use ocular_core::DiagnosisResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Classify the uploaded image in the `file` field.
///
/// The model check runs before the body is touched, so a server without a
/// model answers 500 for every upload. A request that is not multipart at
/// all is treated like one without a file.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DiagnosisResult>, ApiError> {
    if !state.diagnoser.is_available() {
        return Err(ApiError::ModelNotLoaded);
    }

    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "request is not multipart");
        ApiError::NoFile
    })?;

    let (file_name, bytes) = read_file_field(&mut multipart)
        .await?
        .ok_or(ApiError::NoFile)?;

    tracing::debug!(
        file_name = file_name.as_deref().unwrap_or("<none>"),
        bytes = bytes.len(),
        "received upload"
    );

    // Decoding and inference are CPU-bound; keep them off the async workers.
    let diagnoser = state.diagnoser.clone();
    let result = tokio::task::spawn_blocking(move || diagnoser.diagnose(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("inference worker failed: {e}")))??;

    Ok(Json(result))
}

/// Read the first `file` field in full, skipping any other fields.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(Option<String>, Bytes)>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        return Ok(Some((file_name, bytes)));
    }
    Ok(None)
}
