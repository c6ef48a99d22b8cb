//! Client side of the inference service's JSON contract.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ClientError, DiagnosisClient, RemoteDiagnosis, ServiceHealth};
