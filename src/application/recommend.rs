//! Recommendation orchestrator: sequences the pipeline and assembles the
//! audience-specific response payload.
//!
//! Feature encoding, classification, and rule evaluation always run,
//! independently of the requested mode; the mode only shapes the payload
//! and the narrative audience.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{encode, evaluate, HealthState, Indicator, PatientRecord, RecommendationItem};
use crate::ports::{Classifier, TextGenerator};

use super::narrative::{Audience, NarrativeService};

/// Requested response shape. A closed set: unrecognized selectors map to
/// [`Mode::Default`], the safe generic branch, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Patient,
    Doctor,
    Default,
}

impl Mode {
    /// Parse the inbound mode selector.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        match selector {
            "patient" => Self::Patient,
            "doctor" => Self::Doctor,
            _ => Self::Default,
        }
    }
}

/// Patient-facing payload: narrative plus a three-level indicator, nothing
/// else. Classifier internals and rule reasons stay out of this view.
#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    pub ai_text: String,
    pub indicator: Indicator,
}

/// Doctor-facing payload: the full picture for triage.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorView {
    /// Classifier output; `None` when the model is unavailable.
    pub state: Option<HealthState>,
    pub structured_recommendations: Vec<RecommendationItem>,
    pub ai_text: String,
    pub feature_vector: Vec<f64>,
    /// Probability of the high-risk class (index 2), when known. The single
    /// scalar doctors use for triage; always that class slot, never the
    /// argmax class.
    pub risk_score: Option<f64>,
}

/// Audience-dependent response payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    Patient(PatientView),
    Doctor(DoctorView),
}

/// Orchestrates encoder, classifier, rule engine and narrative generation.
pub struct RecommendationService<C, G> {
    classifier: Arc<C>,
    narrative: NarrativeService<G>,
}

impl<C, G> RecommendationService<C, G>
where
    C: Classifier,
    G: TextGenerator,
{
    #[must_use]
    pub fn new(classifier: Arc<C>, narrative: NarrativeService<G>) -> Self {
        Self {
            classifier,
            narrative,
        }
    }

    /// Produce the recommendation payload for a record and mode.
    ///
    /// Infallible at this boundary: classifier absence and narrative
    /// failures have already degraded to `None` / fallback text below it.
    pub async fn recommend(&self, record: &PatientRecord, mode: Mode) -> Recommendation {
        let features = encode(record);
        let state = self.classifier.classify(&features);
        let items = evaluate(record);

        tracing::info!(
            state = state
                .as_ref()
                .map_or("unavailable", |s| s.state_label.as_str()),
            rule_items = items.len(),
            "Pipeline evaluated"
        );

        match mode {
            Mode::Patient => {
                let indicator = Indicator::from_state(state.as_ref());
                tracing::debug!(indicator = %indicator, "Derived patient indicator");
                let ai_text = self
                    .narrative
                    .generate(state.as_ref(), &items, Audience::Patient)
                    .await;
                Recommendation::Patient(PatientView { ai_text, indicator })
            }
            Mode::Doctor => {
                let ai_text = self
                    .narrative
                    .generate(state.as_ref(), &items, Audience::Doctor)
                    .await;
                let risk_score = state
                    .as_ref()
                    .and_then(|s| s.probabilities.as_ref())
                    .and_then(|p| p.get(2))
                    .copied();
                Recommendation::Doctor(DoctorView {
                    risk_score,
                    feature_vector: features.to_vec(),
                    structured_recommendations: items,
                    ai_text,
                    state,
                })
            }
            // Unrecognized selectors get the generic patient-shaped branch
            // with a fixed green indicator, regardless of classifier output.
            Mode::Default => {
                let ai_text = self
                    .narrative
                    .generate(state.as_ref(), &items, Audience::Patient)
                    .await;
                Recommendation::Patient(PatientView {
                    ai_text,
                    indicator: Indicator::Green,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, Measurement};
    use crate::ports::{TextGenError, UnavailableClassifier};
    use async_trait::async_trait;

    struct NoGenerator;

    #[async_trait]
    impl TextGenerator for NoGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, TextGenError> {
            unreachable!("tests run without a configured generator")
        }
    }

    struct FixedClassifier(HealthState);

    impl Classifier for FixedClassifier {
        fn classify(&self, _features: &FeatureVector) -> Option<HealthState> {
            Some(self.0.clone())
        }
    }

    fn rule_only_service() -> RecommendationService<UnavailableClassifier, NoGenerator> {
        RecommendationService::new(Arc::new(UnavailableClassifier), NarrativeService::new(None))
    }

    fn service_with_state(
        state: HealthState,
    ) -> RecommendationService<FixedClassifier, NoGenerator> {
        RecommendationService::new(
            Arc::new(FixedClassifier(state)),
            NarrativeService::new(None),
        )
    }

    #[test]
    fn mode_parsing_is_a_closed_set() {
        assert_eq!(Mode::parse("patient"), Mode::Patient);
        assert_eq!(Mode::parse("doctor"), Mode::Doctor);
        assert_eq!(Mode::parse("admin"), Mode::Default);
        assert_eq!(Mode::parse(""), Mode::Default);
    }

    #[tokio::test]
    async fn patient_mode_indicator_tracks_state_class() {
        let record = PatientRecord::default();

        let result = service_with_state(HealthState::from_class(2, None))
            .recommend(&record, Mode::Patient)
            .await;
        match result {
            Recommendation::Patient(view) => assert_eq!(view.indicator, Indicator::Red),
            Recommendation::Doctor(_) => panic!("expected patient payload"),
        }

        let result = rule_only_service().recommend(&record, Mode::Patient).await;
        match result {
            Recommendation::Patient(view) => assert_eq!(view.indicator, Indicator::Green),
            Recommendation::Doctor(_) => panic!("expected patient payload"),
        }
    }

    #[tokio::test]
    async fn default_mode_pins_indicator_green() {
        let record = PatientRecord::default();
        let result = service_with_state(HealthState::from_class(2, Some(vec![0.0, 0.0, 1.0])))
            .recommend(&record, Mode::Default)
            .await;
        match result {
            Recommendation::Patient(view) => assert_eq!(view.indicator, Indicator::Green),
            Recommendation::Doctor(_) => panic!("expected patient payload"),
        }
    }

    #[tokio::test]
    async fn doctor_mode_reads_risk_from_class_slot_two() {
        let record = PatientRecord::default();
        // Predicted class is 0, but the triage scalar must still be the
        // high-risk slot.
        let state = HealthState::from_class(0, Some(vec![0.1, 0.2, 0.7]));
        let result = service_with_state(state)
            .recommend(&record, Mode::Doctor)
            .await;
        match result {
            Recommendation::Doctor(view) => {
                assert_eq!(view.risk_score, Some(0.7));
            }
            Recommendation::Patient(_) => panic!("expected doctor payload"),
        }
    }

    #[tokio::test]
    async fn doctor_mode_without_probabilities_has_no_risk_score() {
        let record = PatientRecord::default();
        let result = service_with_state(HealthState::from_class(1, None))
            .recommend(&record, Mode::Doctor)
            .await;
        match result {
            Recommendation::Doctor(view) => {
                assert!(view.risk_score.is_none());
                assert!(view.state.is_some());
            }
            Recommendation::Patient(_) => panic!("expected doctor payload"),
        }
    }

    #[tokio::test]
    async fn doctor_payload_carries_features_and_items() {
        let mut record = PatientRecord::default();
        record.profile.age = Some(61);
        record.profile.gender = Some("male".into());
        record.measurements = vec![
            Measurement::new("blood_pressure", 150.0),
            Measurement::new("glucose", 5.0),
            Measurement::new("vitamin_d", 40.0),
        ];

        let result = rule_only_service().recommend(&record, Mode::Doctor).await;
        match result {
            Recommendation::Doctor(view) => {
                assert_eq!(
                    view.feature_vector,
                    vec![61.0, 1.0, 150.0, 5.0, 40.0, 0.0, 0.0, 0.0, 0.0]
                );
                assert_eq!(view.structured_recommendations.len(), 1);
                assert_eq!(
                    view.structured_recommendations[0].name,
                    "Blood-pressure control"
                );
                assert!(view.state.is_none());
                assert!(view.risk_score.is_none());
            }
            Recommendation::Patient(_) => panic!("expected doctor payload"),
        }
    }
}
