//! Inference layer: image normalization, classifier adapters, and the decision policy.

pub mod adapter;
mod error;
pub mod normalize;
pub mod pipeline;
pub mod policy;

pub use adapter::{ClassifierAdapter, FixedScores, ScoreVector, ScoringModel};
pub use error::InferenceError;
pub use normalize::{NormalizedTensor, normalize};
pub use pipeline::Diagnoser;
pub use policy::DecisionPolicy;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
