//! Feature encoding: maps a patient record onto the fixed-order numeric
//! vector consumed by the state classifier.
//!
//! The field order is part of the contract with the classifier artifact and
//! must match the training-time feature order exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;

/// Feature names in classifier order.
pub const FEATURE_NAMES: [&str; 9] = [
    "age",
    "gender",
    "blood_pressure",
    "glucose",
    "vitamin_d",
    "heart_rate",
    "bmi",
    "allergy_count",
    "chronic_count",
];

/// Fixed-order numeric encoding of a patient record.
///
/// Derived, never stored; recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years, 0 when unknown.
    pub age: f64,

    /// Three-way gender code: 1 = male, 0 = female, -1 = unknown.
    pub gender: f64,

    pub blood_pressure: f64,
    pub glucose: f64,
    pub vitamin_d: f64,
    pub heart_rate: f64,
    pub bmi: f64,

    /// Number of declared allergies.
    pub allergy_count: f64,

    /// Number of chronic conditions on record.
    pub chronic_count: f64,
}

impl FeatureVector {
    /// Flatten into classifier input order (matches [`FEATURE_NAMES`]).
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.gender,
            self.blood_pressure,
            self.glucose,
            self.vitamin_d,
            self.heart_rate,
            self.bmi,
            self.allergy_count,
            self.chronic_count,
        ]
    }
}

/// Collapse the measurement list into a per-type map where later entries
/// overwrite earlier ones. Shared with the rule engine: both read only the
/// last value per type.
#[must_use]
pub fn last_measurements(record: &PatientRecord) -> HashMap<&str, f64> {
    let mut last = HashMap::new();
    for m in &record.measurements {
        last.insert(m.measurement_type.as_str(), m.value);
    }
    last
}

/// Encode a patient record into the fixed 9-feature vector.
///
/// Total over all well-formed records: unknown fields encode to their
/// sentinels (age 0, gender -1) and absent measurements to 0.0.
#[must_use]
pub fn encode(record: &PatientRecord) -> FeatureVector {
    let profile = &record.profile;

    let age = f64::from(profile.age.unwrap_or(0));
    let gender = gender_code(profile.gender.as_deref());

    let last = last_measurements(record);
    let value_of = |t: &str| last.get(t).copied().unwrap_or(0.0);

    FeatureVector {
        age,
        gender,
        blood_pressure: value_of("blood_pressure"),
        glucose: value_of("glucose"),
        vitamin_d: value_of("vitamin_d"),
        heart_rate: value_of("heart_rate"),
        bmi: value_of("bmi"),
        allergy_count: profile.allergies.len() as f64,
        chronic_count: profile.chronic_conditions.len() as f64,
    }
}

/// Three-way categorical gender code from the free-text token.
///
/// Matches on the first character, case-insensitively: `m*` is male,
/// `f*` and `ж*` (the localized female marker) are female, everything else
/// including an absent token is the distinct unknown sentinel -1.
fn gender_code(gender: Option<&str>) -> f64 {
    let first = gender
        .and_then(|g| g.chars().next())
        .and_then(|c| c.to_lowercase().next());

    match first {
        Some('m') => 1.0,
        Some('f') | Some('ж') => 0.0,
        _ => -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::Measurement;

    fn record_with_measurements(measurements: Vec<Measurement>) -> PatientRecord {
        PatientRecord {
            measurements,
            ..PatientRecord::default()
        }
    }

    #[test]
    fn last_measurement_per_type_wins() {
        let record = record_with_measurements(vec![
            Measurement::new("blood_pressure", 100.0),
            Measurement::new("glucose", 5.0),
            Measurement::new("blood_pressure", 150.0),
        ]);

        let features = encode(&record);
        assert!((features.blood_pressure - 150.0).abs() < f64::EPSILON);
        assert!((features.glucose - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gender_code_is_three_way() {
        assert!((gender_code(Some("Male")) - 1.0).abs() < f64::EPSILON);
        assert!((gender_code(Some("female")) - 0.0).abs() < f64::EPSILON);
        assert!((gender_code(Some("Жінка")) - 0.0).abs() < f64::EPSILON);
        assert!((gender_code(Some("")) - -1.0).abs() < f64::EPSILON);
        assert!((gender_code(Some("nonbinary")) - -1.0).abs() < f64::EPSILON);
        assert!((gender_code(None) - -1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_values_encode_to_sentinels() {
        let record = PatientRecord::default();
        let features = encode(&record);

        assert_eq!(
            features.to_vec(),
            vec![0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn profile_counts_are_encoded() {
        let mut record = PatientRecord::default();
        record.profile.allergies = vec!["nuts".into(), "penicillin".into()];
        record.profile.chronic_conditions = vec!["asthma".into()];

        let features = encode(&record);
        assert!((features.allergy_count - 2.0).abs() < f64::EPSILON);
        assert!((features.chronic_count - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_order_matches_feature_names() {
        assert_eq!(FEATURE_NAMES.len(), 9);
        let record = record_with_measurements(vec![Measurement::new("heart_rate", 72.0)]);
        let v = encode(&record).to_vec();
        assert_eq!(v.len(), FEATURE_NAMES.len());
        assert!((v[5] - 72.0).abs() < f64::EPSILON);
    }
}
