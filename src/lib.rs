//! # Vitalrec
//!
//! Hybrid health recommendation pipeline: a deterministic rule engine over
//! raw measurements, an optional statistical classifier over a derived
//! feature vector, and a narrative generator that turns both into
//! audience-tailored text with a deterministic fallback.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types and pure logic (record, features, rules)
//! - `ports`: Trait definitions for external collaborators
//! - `adapters`: Concrete implementations (model artifact, chat API, log
//!   redaction)
//! - `application`: Use cases orchestrating domain and ports
//!
//! ## Degradation model
//!
//! Classifier unavailability is not an error: a missing or unusable model
//! artifact puts the handle into a permanent degraded mode and the pipeline
//! runs rule-only. Narrative-generation failures never surface either; the
//! deterministic fallback text is part of the contract.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use application::{Mode, Recommendation, RecommendationService};
pub use domain::{FeatureVector, HealthState, Indicator, PatientRecord, RecommendationItem};

/// Result type for vitalrec operations.
pub type Result<T> = std::result::Result<T, VitalrecError>;

/// Main error type for vitalrec.
///
/// Only setup and inbound-boundary problems live here. Pipeline-internal
/// degradation (absent classifier, narrative fallback) is modeled as data,
/// not errors.
#[derive(Debug, thiserror::Error)]
pub enum VitalrecError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid patient record: {0}")]
    Validation(String),
}
