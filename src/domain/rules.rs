//! Deterministic rule engine over raw measurements and profile facts.
//!
//! Evaluation order is fixed: threshold rules first (blood pressure,
//! glucose, vitamin D), then one item per allergy, then one item per
//! chronic condition. Narrative generation depends on this order.

use serde::{Deserialize, Serialize};

use super::features::last_measurements;
use super::patient::PatientRecord;

/// A deterministic, threshold-derived recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub name: String,
    pub reason: String,
    /// Relative priority in [0, 1]. Items are kept in evaluation order,
    /// not sorted by this.
    pub priority: f64,
}

impl RecommendationItem {
    fn new(name: impl Into<String>, reason: impl Into<String>, priority: f64) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
            priority,
        }
    }
}

/// Evaluate the deterministic rules against a patient record.
///
/// Pure and total. Thresholds are strict inequalities; a measurement type
/// that never appears is skipped, never treated as zero.
#[must_use]
pub fn evaluate(record: &PatientRecord) -> Vec<RecommendationItem> {
    let mut items = Vec::new();
    let last = last_measurements(record);

    if let Some(&bp) = last.get("blood_pressure") {
        if bp > 140.0 {
            items.push(RecommendationItem::new(
                "Blood-pressure control",
                format!("Blood pressure reading {bp} is above 140"),
                0.9,
            ));
        }
    }

    if let Some(&glucose) = last.get("glucose") {
        if glucose > 6.2 {
            items.push(RecommendationItem::new(
                "Reduce carbohydrate intake",
                format!("Elevated glucose level {glucose}"),
                0.85,
            ));
        }
    }

    if let Some(&vitamin_d) = last.get("vitamin_d") {
        if vitamin_d < 30.0 {
            items.push(RecommendationItem::new(
                "Additional vitamin D support",
                format!("Low vitamin D level: {vitamin_d}"),
                0.8,
            ));
        }
    }

    for allergy in &record.profile.allergies {
        items.push(RecommendationItem::new(
            format!("Avoid products containing {allergy}"),
            "Declared allergy in the patient profile",
            1.0,
        ));
    }

    for condition in &record.profile.chronic_conditions {
        items.push(RecommendationItem::new(
            format!("Regular monitoring for '{condition}'"),
            "Chronic condition on record",
            0.7,
        ));
    }

    items
}
