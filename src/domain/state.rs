//! Health state types: the classifier's discrete output and the
//! patient-facing indicator derived from it.

use serde::{Deserialize, Serialize};

/// Discrete health state predicted by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    /// Predicted class index.
    pub state_class: u32,

    /// Human-readable label for the class.
    pub state_label: String,

    /// Per-class probabilities aligned to class index, when the underlying
    /// model can produce confidence estimates.
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
}

impl HealthState {
    /// Build a state from a raw class, attaching the canonical label.
    #[must_use]
    pub fn from_class(state_class: u32, probabilities: Option<Vec<f64>>) -> Self {
        Self {
            state_class,
            state_label: state_label(state_class),
            probabilities,
        }
    }
}

/// Canonical label for a state class; unmapped classes stringify as-is.
#[must_use]
pub fn state_label(class: u32) -> String {
    match class {
        0 => "normal".to_string(),
        1 => "attention_needed".to_string(),
        2 => "high_risk".to_string(),
        other => other.to_string(),
    }
}

/// Three-level patient-facing severity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// No significant findings, or classifier unavailable.
    Green,
    /// Attention needed, follow-up recommended.
    Yellow,
    /// High risk, consultation advised.
    Red,
}

impl Indicator {
    /// Derive the indicator from the classifier output.
    ///
    /// An absent classifier result reads as green: the deterministic rules
    /// still run, and the patient view must not alarm on missing signal.
    #[must_use]
    pub fn from_state(state: Option<&HealthState>) -> Self {
        match state.map(|s| s.state_class) {
            Some(1) => Self::Yellow,
            Some(2) => Self::Red,
            _ => Self::Green,
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Yellow => write!(f, "yellow"),
            Self::Red => write!(f, "red"),
        }
    }
}
