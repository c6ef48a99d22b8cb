//! HTTP client for submitting fundus scans to a running Ocular service.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ocular_core::{ClassLabel, DiagnosisResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A diagnosis returned by the service, stamped on receipt.
#[derive(Debug, Clone)]
pub struct RemoteDiagnosis {
    pub file_name: String,
    pub result: DiagnosisResult,
    pub received_at: DateTime<Utc>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub model_loaded: bool,
    pub model: Option<String>,
    pub threshold: f32,
    pub labels: Vec<ClassLabel>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the `/predict` and `/health` endpoints.
pub struct DiagnosisClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiagnosisClient {
    /// Create a client for the given service base URL.
    ///
    /// `base_url` should be like `http://127.0.0.1:8000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    /// Upload image bytes as the `file` field of a multipart form.
    pub async fn predict(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DiagnosisResult, ClientError> {
        let url = self.predict_url();
        let size = bytes.len();
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        info!(url = %url, file = file_name, bytes = size, "submitting scan");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status.as_u16(), &body));
        }

        let result: DiagnosisResult = resp.json().await?;
        info!(class = %result.prediction, confidence = result.confidence, "diagnosis received");
        Ok(result)
    }

    /// Read an image from disk and submit it.
    pub async fn predict_file(&self, path: &Path) -> Result<RemoteDiagnosis, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let result = self.predict(&file_name, bytes).await?;
        Ok(RemoteDiagnosis {
            file_name,
            result,
            received_at: Utc::now(),
        })
    }

    /// Query `GET /health`.
    pub async fn health(&self) -> Result<ServiceHealth, ClientError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status.as_u16(), &body));
        }
        Ok(resp.json().await?)
    }
}

/// Build a [`ClientError::Server`], preferring the service's `error` message
/// over the raw body.
fn server_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string());
    ClientError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocular_core::Prediction;

    #[test]
    fn client_trims_trailing_slash() {
        let client = DiagnosisClient::new("http://127.0.0.1:8000/".into());
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
        assert_eq!(client.predict_url(), "http://127.0.0.1:8000/predict");
    }

    #[test]
    fn server_error_uses_error_field() {
        let err = server_error(400, r#"{"error": "No file uploaded"}"#);
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "No file uploaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_error_falls_back_to_body() {
        let err = server_error(502, "Bad Gateway");
        assert_eq!(err.to_string(), "server returned 502: Bad Gateway");
    }

    #[test]
    fn parse_predict_response() {
        let json = r#"{
            "class": "Glaucoma",
            "confidence": 0.82,
            "scores": {"Cataract": 0.05, "Diabetic Retinopathy": 0.08, "Glaucoma": 0.82, "Normal": 0.05},
            "message": "Analysis successful."
        }"#;
        let result: DiagnosisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.prediction, Prediction::Condition(ClassLabel::Glaucoma));
        assert_eq!(result.scores.get(ClassLabel::Glaucoma), Some(0.82));
    }

    #[test]
    fn parse_health_response() {
        let json = r#"{
            "status": "ok",
            "model_loaded": false,
            "model": null,
            "threshold": 0.75,
            "labels": ["Cataract", "Diabetic Retinopathy", "Glaucoma", "Normal"]
        }"#;
        let health: ServiceHealth = serde_json::from_str(json).unwrap();
        assert!(!health.model_loaded);
        assert!(health.model.is_none());
        assert_eq!(health.labels[1], ClassLabel::DiabeticRetinopathy);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let client = DiagnosisClient::new("http://127.0.0.1:9".into());
        let err = client
            .predict_file(Path::new("/nonexistent/scan.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
