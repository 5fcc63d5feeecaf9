//! Narrative generation: audience-tailored text with a deterministic
//! fallback.
//!
//! `generate` never fails. When no text-generation endpoint is configured,
//! or the call errors out in any way, the deterministic fallback text is
//! returned instead; upstream failures are logged, never propagated.

use crate::domain::{HealthState, RecommendationItem};
use crate::ports::TextGenerator;

/// System instruction sent with every generation request.
const SYSTEM_PROMPT: &str = "You are a medical assistant. Never state a diagnosis.";

/// Fixed fallback when the rule engine produced nothing.
const NO_DEVIATIONS_TEXT: &str = "No critical deviations were found in the provided data. \
     If anything changes, consult your physician.";

/// Who the generated text is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Plain language, no terminology, no risk figures.
    Patient,
    /// Professional tone, terminology allowed, still no diagnosis.
    Doctor,
}

/// Produces narrative text from the classifier output and rule items.
///
/// Holds the text generator when one is configured; without it the service
/// is fallback-only, which is a fully supported mode.
pub struct NarrativeService<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> NarrativeService<G> {
    #[must_use]
    pub fn new(generator: Option<G>) -> Self {
        Self { generator }
    }

    /// Generate audience-tailored narrative text. Always returns text.
    pub async fn generate(
        &self,
        state: Option<&HealthState>,
        items: &[RecommendationItem],
        audience: Audience,
    ) -> String {
        let Some(generator) = &self.generator else {
            tracing::debug!("No text-generation endpoint configured, using fallback text");
            return fallback_text(items);
        };

        let user_prompt = match audience {
            Audience::Patient => patient_prompt(items),
            Audience::Doctor => doctor_prompt(state, items),
        };

        match generator.complete(SYSTEM_PROMPT, &user_prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Text generation failed, using fallback text");
                fallback_text(items)
            }
        }
    }
}

/// Deterministic fallback text: fixed message when there are no items,
/// otherwise one line per item plus a non-diagnosis disclaimer.
#[must_use]
pub fn fallback_text(items: &[RecommendationItem]) -> String {
    if items.is_empty() {
        return NO_DEVIATIONS_TEXT.to_string();
    }

    let mut lines = vec!["Preliminary recommendations based on current readings:".to_string()];
    for item in items {
        lines.push(format!("- {}: {}", item.name, item.reason));
    }
    lines.push(
        "These suggestions are not a medical diagnosis. Be sure to consult your physician."
            .to_string(),
    );
    lines.join("\n")
}

fn patient_prompt(items: &[RecommendationItem]) -> String {
    let rec_lines = items
        .iter()
        .map(|r| format!("- {}", r.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write short, friendly and calm recommendations for a patient based on their \
         medical data. Avoid medical terminology, diagnoses, risk figures or complicated \
         explanations. Do not frighten the patient; emphasize simple actions and support. \
         Do not mention probabilities or state classes.\n\n\
         Recommendations:\n{rec_lines}\n\n\
         Produce a short, clear text with the recommendations plainly highlighted. \
         When vitamins are mentioned, explain which foods contain them. \
         Begin the message with \"Hello, I will help you improve your health! \
         Here is what I would recommend:\"."
    )
}

fn doctor_prompt(state: Option<&HealthState>, items: &[RecommendationItem]) -> String {
    let state_label = state.map_or("unavailable", |s| s.state_label.as_str());
    let probabilities = state
        .and_then(|s| s.probabilities.as_ref())
        .map_or_else(|| "unavailable".to_string(), |p| format!("{p:?}"));

    let rec_lines = items
        .iter()
        .map(|r| format!("- {} (reason: {})", r.name, r.reason))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write a professional, structured medical summary for a physician based on the \
         patient data. Terminology is allowed, but do not state a diagnosis. Include a \
         brief clinical overview, the key indicators, and the proposed actions. Present \
         the information clearly and without emotion. Use the data below:\n\n\
         Classifier state: {state_label}\n\
         Class probabilities: {probabilities}\n\n\
         Rule-based recommendations:\n{rec_lines}\n\n\
         Limit the message to 1000 characters. \
         Begin the message with \"Characteristic findings for this patient:\"."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TextGenError;
    use async_trait::async_trait;

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, TextGenError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, TextGenError> {
            Err(TextGenError::Status(503))
        }
    }

    fn items() -> Vec<RecommendationItem> {
        crate::domain::evaluate(&{
            let mut r = crate::domain::PatientRecord::default();
            r.measurements = vec![crate::domain::Measurement::new("blood_pressure", 155.0)];
            r
        })
    }

    #[test]
    fn fallback_without_items_is_fixed_verbatim() {
        assert_eq!(fallback_text(&[]), NO_DEVIATIONS_TEXT);
        // Idempotent: same text on every call.
        assert_eq!(fallback_text(&[]), fallback_text(&[]));
    }

    #[test]
    fn fallback_lists_items_with_reasons_and_disclaimer() {
        let text = fallback_text(&items());
        assert!(text.contains("- Blood-pressure control:"));
        assert!(text.contains("155"));
        assert!(text.contains("not a medical diagnosis"));
    }

    #[tokio::test]
    async fn unconfigured_generator_falls_back() {
        let service: NarrativeService<FixedGenerator> = NarrativeService::new(None);
        let text = service.generate(None, &[], Audience::Patient).await;
        assert_eq!(text, NO_DEVIATIONS_TEXT);
    }

    #[tokio::test]
    async fn failing_generator_falls_back() {
        let service = NarrativeService::new(Some(FailingGenerator));
        let text = service.generate(None, &items(), Audience::Doctor).await;
        assert!(text.contains("Blood-pressure control"));
        assert!(text.contains("not a medical diagnosis"));
    }

    #[tokio::test]
    async fn working_generator_text_is_returned_as_is() {
        let service = NarrativeService::new(Some(FixedGenerator("generated advice")));
        let text = service.generate(None, &items(), Audience::Patient).await;
        assert_eq!(text, "generated advice");
    }

    #[test]
    fn patient_prompt_lists_names_only() {
        let prompt = patient_prompt(&items());
        assert!(prompt.contains("- Blood-pressure control"));
        assert!(!prompt.contains("reason:"));
        assert!(prompt.contains("Hello, I will help you improve your health!"));
    }

    #[test]
    fn doctor_prompt_carries_state_and_reasons() {
        let state = HealthState::from_class(2, Some(vec![0.1, 0.2, 0.7]));
        let prompt = doctor_prompt(Some(&state), &items());
        assert!(prompt.contains("high_risk"));
        assert!(prompt.contains("0.7"));
        assert!(prompt.contains("(reason: Blood pressure reading 155 is above 140)"));
        assert!(prompt.contains("Characteristic findings for this patient:"));
    }

    #[test]
    fn doctor_prompt_handles_absent_classifier() {
        let prompt = doctor_prompt(None, &[]);
        assert!(prompt.contains("Classifier state: unavailable"));
        assert!(prompt.contains("Class probabilities: unavailable"));
    }
}
