//! Domain layer: core business types and pure logic.
//!
//! Feature encoding and rule evaluation are pure, total functions over the
//! patient record; nothing in this layer performs I/O or can fail for a
//! well-formed record.

pub mod features;
mod patient;
pub mod rules;
mod state;

pub use features::{encode, FeatureVector, FEATURE_NAMES};
pub use patient::{MedicalFile, Measurement, PatientProfile, PatientRecord, Prescription};
pub use rules::{evaluate, RecommendationItem};
pub use state::{state_label, HealthState, Indicator};
