//! Normalize → score → decide, for one uploaded image.

use std::time::Instant;

use ocular_core::{DiagnosisResult, ServiceConfig};
use tracing::{debug, info};

use crate::adapter::ClassifierAdapter;
use crate::error::InferenceError;
use crate::normalize::normalize;
use crate::policy::DecisionPolicy;

/// The full inference pipeline over a shared classifier.
///
/// Cheap to clone: the model is held behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Diagnoser {
    adapter: ClassifierAdapter,
    policy: DecisionPolicy,
}

impl Diagnoser {
    pub fn new(adapter: ClassifierAdapter, config: &ServiceConfig) -> Self {
        Self {
            adapter,
            policy: DecisionPolicy::from_config(config),
        }
    }

    pub fn adapter(&self) -> &ClassifierAdapter {
        &self.adapter
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn is_available(&self) -> bool {
        self.adapter.is_available()
    }

    /// Run the pipeline on raw upload bytes.
    ///
    /// Availability is checked before the bytes are decoded.
    pub fn diagnose(&self, bytes: &[u8]) -> Result<DiagnosisResult, InferenceError> {
        if !self.adapter.is_available() {
            return Err(InferenceError::ModelUnavailable);
        }

        let start = Instant::now();
        let tensor = normalize(bytes)?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "normalized upload");

        let scores = self.adapter.predict(&tensor, self.policy.labels())?;
        let result = self.policy.decide(&scores);

        info!(
            class = %result.prediction,
            confidence = result.confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "diagnosis complete"
        );
        Ok(result)
    }
}
