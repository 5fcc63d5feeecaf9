//! Patient record types: the immutable input of the recommendation pipeline.
//!
//! The record mirrors the upstream medical service's wire format. `files` and
//! `prescriptions` travel with the record but are not consumed by the core
//! pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single measurement taken from the patient.
///
/// The measurement list may contain several entries of the same type; the
/// last occurrence per type is the authoritative one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Measurement kind, e.g. `blood_pressure`, `glucose`, `vitamin_d`.
    pub measurement_type: String,

    /// Observed value in the unit conventional for the type.
    pub value: f64,

    /// Where the value came from (device, lab, manual entry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the value was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// An attached medical document. Opaque to the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalFile {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub content_ref: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// An active prescription. Opaque to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

/// Static profile facts about the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Age in years.
    #[serde(default)]
    pub age: Option<u32>,

    /// Free-text gender token as entered upstream (any language).
    #[serde(default)]
    pub gender: Option<String>,

    /// Declared allergies, in profile order.
    #[serde(default)]
    pub allergies: Vec<String>,

    /// Chronic conditions on record, in profile order.
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
}

/// Complete patient record handed to the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    pub profile: PatientProfile,

    #[serde(default)]
    pub measurements: Vec<Measurement>,

    #[serde(default)]
    pub files: Vec<MedicalFile>,

    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
}

impl Measurement {
    /// Create a measurement with no source or timestamp.
    #[must_use]
    pub fn new(measurement_type: impl Into<String>, value: f64) -> Self {
        Self {
            measurement_type: measurement_type.into(),
            value,
            source: None,
            recorded_at: None,
        }
    }
}
