//! Confidence-thresholded decision between a diagnosis and "inconclusive".
//!
//! Out-of-domain inputs (anything that is not a fundus photograph) tend to
//! produce flat, low-confidence distributions. The threshold is the only
//! guard against confidently labelling them.

use ocular_core::diagnosis::{LOW_CONFIDENCE_MESSAGE, SUCCESS_MESSAGE};
use ocular_core::{ClassScores, DiagnosisResult, LabelOrder, Prediction, ServiceConfig};

use crate::adapter::ScoreVector;

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPolicy {
    threshold: f32,
    labels: LabelOrder,
}

impl DecisionPolicy {
    pub fn new(threshold: f32, labels: LabelOrder) -> Self {
        Self { threshold, labels }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.threshold, config.labels)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn labels(&self) -> &LabelOrder {
        &self.labels
    }

    /// Turn raw scores into a [`DiagnosisResult`].
    ///
    /// A top score strictly below the threshold yields
    /// [`Prediction::Inconclusive`]; the top score is reported as confidence
    /// either way, and every class score is included.
    pub fn decide(&self, scores: &ScoreVector) -> DiagnosisResult {
        let per_class = ClassScores::new(
            self.labels
                .iter()
                .zip(scores.as_slice().iter().copied())
                .collect(),
        );

        let top = scores
            .argmax()
            .and_then(|(index, score)| self.labels.get(index).map(|label| (label, score)));

        match top {
            Some((label, confidence)) if confidence >= self.threshold => DiagnosisResult {
                prediction: Prediction::Condition(label),
                confidence,
                scores: per_class,
                message: SUCCESS_MESSAGE.to_string(),
            },
            top => DiagnosisResult {
                prediction: Prediction::Inconclusive,
                confidence: top.map_or(0.0, |(_, score)| score),
                scores: per_class,
                message: LOW_CONFIDENCE_MESSAGE.to_string(),
            },
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}
