pub mod config;
pub mod diagnosis;
pub mod diseases;
pub mod label;

pub use config::{ConfigError, ServiceConfig};
pub use diagnosis::{ClassScores, DiagnosisResult, Finding, Prediction};
pub use diseases::{DiseaseInfo, disease_info, find_disease};
pub use label::{ClassLabel, LabelError, LabelOrder, NUM_CLASSES};
