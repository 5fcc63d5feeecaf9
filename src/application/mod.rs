//! Application layer: services orchestrating domain logic and ports.

mod narrative;
mod recommend;

pub use narrative::{fallback_text, Audience, NarrativeService};
pub use recommend::{DoctorView, Mode, PatientView, Recommendation, RecommendationService};
