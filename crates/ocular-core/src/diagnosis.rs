//! Diagnosis result types shared by the service, the client, and the CLI.
//!
//! `DiagnosisResult` is the wire contract of `POST /predict`:
//!
//! ```json
//! {
//!   "class": "Cataract",
//!   "confidence": 0.9,
//!   "scores": { "Cataract": 0.9, "Diabetic Retinopathy": 0.03, "Glaucoma": 0.03, "Normal": 0.04 },
//!   "message": "Analysis successful."
//! }
//! ```

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::label::ClassLabel;

/// Sentinel reported instead of a label when confidence is below threshold.
pub const INCONCLUSIVE_LABEL: &str = "Unknown / Invalid Image";

/// Message attached to a concrete diagnosis.
pub const SUCCESS_MESSAGE: &str = "Analysis successful.";

/// Message attached to an inconclusive result.
pub const LOW_CONFIDENCE_MESSAGE: &str = "Low confidence. This may not be a retinal scan.";

/// Shown beneath every clinical report.
pub const MEDICAL_DISCLAIMER: &str = "Medical Disclaimer: This result is generated by an AI model. \
It is not a substitute for professional medical advice. Please consult an ophthalmologist.";

/// Outcome of the decision policy: a concrete class or the inconclusive sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Condition(ClassLabel),
    Inconclusive,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Condition(label) => label.as_str(),
            Self::Inconclusive => INCONCLUSIVE_LABEL,
        }
    }

    pub fn label(&self) -> Option<ClassLabel> {
        match self {
            Self::Condition(label) => Some(*label),
            Self::Inconclusive => None,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == INCONCLUSIVE_LABEL {
            return Ok(Self::Inconclusive);
        }
        s.parse::<ClassLabel>()
            .map(Self::Condition)
            .map_err(de::Error::custom)
    }
}

/// Per-class probabilities in model output order.
///
/// Serialized as a JSON object whose keys follow the stored order, so the
/// response mirrors the model's label order rather than an alphabetical one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassScores(Vec<(ClassLabel, f32)>);

impl ClassScores {
    pub fn new(scores: Vec<(ClassLabel, f32)>) -> Self {
        Self(scores)
    }

    pub fn get(&self, label: ClassLabel) -> Option<f32> {
        self.0
            .iter()
            .find_map(|&(l, score)| (l == label).then_some(score))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, f32)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ClassScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, score) in &self.0 {
            map.serialize_entry(label.as_str(), score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = ClassScores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of class label to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = Vec::with_capacity(access.size_hint().unwrap_or(4));
                while let Some((name, score)) = access.next_entry::<String, f32>()? {
                    let label = name.parse::<ClassLabel>().map_err(de::Error::custom)?;
                    scores.push((label, score));
                }
                Ok(ClassScores(scores))
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// The full result of one prediction request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    #[serde(rename = "class")]
    pub prediction: Prediction,
    /// Raw maximum score, reported even when the prediction is inconclusive.
    pub confidence: f32,
    pub scores: ClassScores,
    pub message: String,
}

impl DiagnosisResult {
    pub fn finding(&self) -> Finding {
        Finding::of(self.prediction)
    }
}

/// Coarse reading of a prediction used to pick the report banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    /// Normal retina.
    Healthy,
    /// One of the disease classes above threshold.
    Abnormal,
    /// Below threshold; possibly not a fundus image.
    Inconclusive,
}

impl Finding {
    pub fn of(prediction: Prediction) -> Self {
        match prediction {
            Prediction::Condition(ClassLabel::Normal) => Self::Healthy,
            Prediction::Condition(_) => Self::Abnormal,
            Prediction::Inconclusive => Self::Inconclusive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Abnormal => "abnormal",
            Self::Inconclusive => "inconclusive",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(prediction: Prediction, confidence: f32) -> DiagnosisResult {
        DiagnosisResult {
            prediction,
            confidence,
            scores: ClassScores::new(vec![
                (ClassLabel::Cataract, 0.9),
                (ClassLabel::DiabeticRetinopathy, 0.03),
                (ClassLabel::Glaucoma, 0.03),
                (ClassLabel::Normal, 0.04),
            ]),
            message: SUCCESS_MESSAGE.into(),
        }
    }

    #[test]
    fn result_uses_class_key() {
        let json = serde_json::to_value(sample(Prediction::Condition(ClassLabel::Cataract), 0.9))
            .unwrap();
        assert_eq!(json["class"], "Cataract");
        assert_eq!(json["message"], "Analysis successful.");
        assert!((json["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!(json.get("prediction").is_none());
    }

    #[test]
    fn inconclusive_serializes_as_sentinel() {
        let json = serde_json::to_value(sample(Prediction::Inconclusive, 0.3)).unwrap();
        assert_eq!(json["class"], "Unknown / Invalid Image");
    }

    #[test]
    fn scores_keep_model_order() {
        let scores = ClassScores::new(vec![
            (ClassLabel::Normal, 0.1),
            (ClassLabel::Glaucoma, 0.2),
            (ClassLabel::Cataract, 0.3),
            (ClassLabel::DiabeticRetinopathy, 0.4),
        ]);
        let json = serde_json::to_string(&scores).unwrap();
        let normal = json.find("Normal").unwrap();
        let glaucoma = json.find("Glaucoma").unwrap();
        let cataract = json.find("Cataract").unwrap();
        let dr = json.find("Diabetic Retinopathy").unwrap();
        assert!(normal < glaucoma && glaucoma < cataract && cataract < dr);
    }

    #[test]
    fn result_json_roundtrip() {
        let original = sample(Prediction::Condition(ClassLabel::Cataract), 0.9);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: DiagnosisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.scores.get(ClassLabel::Normal), Some(0.04));
    }

    #[test]
    fn parse_service_response_with_sentinel() {
        let json = r#"{
            "class": "Unknown / Invalid Image",
            "confidence": 0.3,
            "scores": {"Cataract": 0.3, "Diabetic Retinopathy": 0.3, "Glaucoma": 0.2, "Normal": 0.2},
            "message": "Low confidence. This may not be a retinal scan."
        }"#;
        let parsed: DiagnosisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.prediction, Prediction::Inconclusive);
        assert_eq!(parsed.scores.len(), 4);
        assert_eq!(parsed.finding(), Finding::Inconclusive);
    }

    #[test]
    fn unknown_score_key_is_rejected() {
        let json = r#"{"Cataract": 0.5, "Retinitis": 0.5}"#;
        assert!(serde_json::from_str::<ClassScores>(json).is_err());
    }

    #[test]
    fn finding_from_prediction() {
        assert_eq!(
            Finding::of(Prediction::Condition(ClassLabel::Normal)),
            Finding::Healthy
        );
        assert_eq!(
            Finding::of(Prediction::Condition(ClassLabel::Glaucoma)),
            Finding::Abnormal
        );
        assert_eq!(Finding::of(Prediction::Inconclusive), Finding::Inconclusive);
    }
}
