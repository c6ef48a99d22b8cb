//! Service configuration shared by the server and the local CLI pipeline.

use thiserror::Error;

use crate::label::LabelOrder;

/// Default minimum top-class probability for a concrete diagnosis.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.75;

/// Default upload limit for `POST /predict` (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold must be within [0, 1], got {0}")]
    Threshold(f32),
    #[error("upload limit must be greater than zero")]
    UploadLimit,
}

/// Runtime settings consumed by the inference pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Below this top-class probability the result is inconclusive.
    pub threshold: f32,
    /// Positional meaning of the classifier's output vector. Must match the
    /// order the model was exported with.
    pub labels: LabelOrder,
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels: LabelOrder::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_labels(mut self, labels: LabelOrder) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Check value ranges. `LabelOrder` validates itself on construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::UploadLimit);
        }
        if self.labels != LabelOrder::default() {
            tracing::warn!(labels = %self.labels, "using non-default class label order");
        }
        Ok(())
    }
}
