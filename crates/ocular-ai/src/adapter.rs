//! Narrow seam between the pipeline and whatever produces class scores.

use std::sync::Arc;

use ocular_core::LabelOrder;
use tracing::warn;

use crate::error::InferenceError;
use crate::normalize::NormalizedTensor;

/// Tolerance on the sum of a probability vector before we warn that the
/// model output does not look like a softmax.
const SUM_TOLERANCE: f32 = 0.05;

/// A loaded model that scores a normalized image.
///
/// Implementations must be safe to call from several request handlers at
/// once; backends whose runtime needs exclusive access serialize internally.
pub trait ScoringModel: Send + Sync {
    /// Identifier for logs and `/health` (e.g. the model file name).
    fn name(&self) -> &str;

    /// Raw per-class probabilities, positionally aligned with the label
    /// order the model was exported with.
    fn predict(&self, input: &NormalizedTensor) -> anyhow::Result<Vec<f32>>;
}

/// Probabilities for each class, in model output order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector(Vec<f32>);

impl ScoreVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index and value of the largest score. Ties resolve to the lowest index.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.0.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        best
    }
}

/// Process-wide handle to the scoring model.
///
/// Built once at startup and shared read-only by every request. When no
/// model could be loaded the adapter is permanently unavailable and every
/// prediction fails with [`InferenceError::ModelUnavailable`].
#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Option<Arc<dyn ScoringModel>>,
}

impl ClassifierAdapter {
    pub fn new(model: impl ScoringModel + 'static) -> Self {
        Self {
            model: Some(Arc::new(model)),
        }
    }

    pub fn from_shared(model: Arc<dyn ScoringModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Score `input`, checking the output against `labels`.
    ///
    /// A vector of the wrong length or with negative/non-finite entries is a
    /// scoring failure rather than something to truncate or pad.
    pub fn predict(
        &self,
        input: &NormalizedTensor,
        labels: &LabelOrder,
    ) -> Result<ScoreVector, InferenceError> {
        let model = self
            .model
            .as_deref()
            .ok_or(InferenceError::ModelUnavailable)?;

        let scores = model.predict(input).map_err(InferenceError::Scoring)?;

        if scores.len() != labels.len() {
            return Err(InferenceError::Scoring(anyhow::anyhow!(
                "model returned {} scores, expected {} ({labels})",
                scores.len(),
                labels.len()
            )));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(InferenceError::Scoring(anyhow::anyhow!(
                "model returned an invalid score: {bad}"
            )));
        }

        let sum: f32 = scores.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            warn!(sum, model = model.name(), "scores do not sum to 1; is the softmax missing?");
        }

        Ok(ScoreVector::new(scores))
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("model", &self.model_name())
            .finish()
    }
}

/// A model that returns the same scores for every input.
///
/// Stands in for a real classifier in tests and offline demos.
#[derive(Debug, Clone)]
pub struct FixedScores {
    scores: Vec<f32>,
}

impl FixedScores {
    pub fn new(scores: impl Into<Vec<f32>>) -> Self {
        Self {
            scores: scores.into(),
        }
    }
}

impl ScoringModel for FixedScores {
    fn name(&self) -> &str {
        "fixed-scores"
    }

    fn predict(&self, _input: &NormalizedTensor) -> anyhow::Result<Vec<f32>> {
        Ok(self.scores.clone())
    }
}
