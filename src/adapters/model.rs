//! Classifier adapter backed by an offline-exported model artifact.
//!
//! The artifact is a JSON document produced by the training pipeline:
//! feature names, class ids, and the model parameters for one of the
//! supported model kinds. Dimensions and the class contract are checked at
//! load time; after that, prediction is plain arithmetic.
//!
//! A missing, empty, or malformed artifact does not fail the process: the
//! handle is constructed in a permanently unavailable state and every
//! `classify` call returns `None`.

use std::path::Path;

use serde::Deserialize;

use crate::domain::{FeatureVector, HealthState, FEATURE_NAMES};
use crate::ports::Classifier;

/// Class ids the pipeline is contracted to: index 2 is read as the
/// high-risk probability slot by the doctor view.
const EXPECTED_CLASSES: [u32; 3] = [0, 1, 2];

/// Artifact load failure. Internal to the adapter: the public surface
/// degrades to an unavailable handle instead of surfacing this.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact file is empty")]
    Empty,

    #[error("invalid model artifact format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("model contract violation: {0}")]
    Contract(String),
}

/// Model parameters exported by the offline training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedModel {
    /// Training-time feature order. Must match the encoder's order exactly.
    pub feature_names: Vec<String>,

    /// Class ids aligned to parameter rows. Must be exactly `[0, 1, 2]`.
    pub classes: Vec<u32>,

    /// Optional standardization applied before the model parameters.
    #[serde(default)]
    pub scaler_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scaler_scale: Option<Vec<f64>>,

    #[serde(flatten)]
    pub params: ModelParams,
}

/// Supported exported model kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    /// Softmax over per-class linear scores. Produces probabilities.
    MultinomialLogistic {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },

    /// Minimum Euclidean distance to per-class centroids. Predicts a class
    /// but carries no confidence estimates.
    NearestCentroid { centroids: Vec<Vec<f64>> },
}

impl ExportedModel {
    fn validate(&self) -> Result<(), ArtifactError> {
        let n = FEATURE_NAMES.len();

        if self.feature_names != FEATURE_NAMES {
            return Err(ArtifactError::Contract(format!(
                "feature_names {:?} do not match encoder order {FEATURE_NAMES:?}",
                self.feature_names
            )));
        }
        if self.classes != EXPECTED_CLASSES {
            return Err(ArtifactError::Contract(format!(
                "classes {:?} must be exactly {EXPECTED_CLASSES:?}",
                self.classes
            )));
        }

        let check_rows = |rows: &[Vec<f64>], what: &str| -> Result<(), ArtifactError> {
            if rows.len() != EXPECTED_CLASSES.len() {
                return Err(ArtifactError::Contract(format!(
                    "{what} must have {} rows, got {}",
                    EXPECTED_CLASSES.len(),
                    rows.len()
                )));
            }
            for row in rows {
                if row.len() != n {
                    return Err(ArtifactError::Contract(format!(
                        "{what} row length {} does not match {n} features",
                        row.len()
                    )));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(ArtifactError::Contract(format!(
                        "{what} contains non-finite values"
                    )));
                }
            }
            Ok(())
        };

        match &self.params {
            ModelParams::MultinomialLogistic {
                coefficients,
                intercepts,
            } => {
                check_rows(coefficients, "coefficients")?;
                if intercepts.len() != EXPECTED_CLASSES.len()
                    || intercepts.iter().any(|v| !v.is_finite())
                {
                    return Err(ArtifactError::Contract(
                        "intercepts must be 3 finite values".to_string(),
                    ));
                }
            }
            ModelParams::NearestCentroid { centroids } => {
                check_rows(centroids, "centroids")?;
            }
        }

        for (name, scaler) in [
            ("scaler_mean", &self.scaler_mean),
            ("scaler_scale", &self.scaler_scale),
        ] {
            if let Some(values) = scaler {
                if values.len() != n || values.iter().any(|v| !v.is_finite()) {
                    return Err(ArtifactError::Contract(format!(
                        "{name} must be {n} finite values"
                    )));
                }
            }
        }

        Ok(())
    }

    fn kind_name(&self) -> &'static str {
        match self.params {
            ModelParams::MultinomialLogistic { .. } => "multinomial_logistic",
            ModelParams::NearestCentroid { .. } => "nearest_centroid",
        }
    }

    fn standardize(&self, mut x: Vec<f64>) -> Vec<f64> {
        if let Some(mean) = &self.scaler_mean {
            for (v, m) in x.iter_mut().zip(mean) {
                *v -= m;
            }
        }
        if let Some(scale) = &self.scaler_scale {
            for (v, s) in x.iter_mut().zip(scale) {
                if *s != 0.0 {
                    *v /= s;
                }
            }
        }
        x
    }
}

/// Classifier handle wrapping an exported model artifact.
///
/// Constructed once at process start and shared read-only across requests.
/// Load failures leave the handle unavailable for the process lifetime;
/// there is no retry.
pub struct ModelClassifier {
    model: Option<ExportedModel>,
}

impl ModelClassifier {
    /// Load the artifact at `path`.
    ///
    /// Never fails: any problem (missing file, empty file, bad JSON,
    /// contract violation) is logged and yields an unavailable handle.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::read_artifact(path) {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    kind = model.kind_name(),
                    "Loaded classifier model artifact"
                );
                Self { model: Some(model) }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Classifier unavailable, continuing with rules only"
                );
                Self { model: None }
            }
        }
    }

    /// Whether a model was successfully loaded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    fn read_artifact(path: &Path) -> Result<ExportedModel, ArtifactError> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() == 0 {
            return Err(ArtifactError::Empty);
        }

        let content = std::fs::read_to_string(path)?;
        let model: ExportedModel = serde_json::from_str(&content)?;
        model.validate()?;
        Ok(model)
    }
}

impl Classifier for ModelClassifier {
    fn classify(&self, features: &FeatureVector) -> Option<HealthState> {
        let model = self.model.as_ref()?;

        let x = features.to_vec();
        if x.iter().any(|v| !v.is_finite()) {
            tracing::warn!("Non-finite feature input, skipping classification");
            return None;
        }
        let x = model.standardize(x);

        match &model.params {
            ModelParams::MultinomialLogistic {
                coefficients,
                intercepts,
            } => {
                let logits: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, b)| dot(row, &x) + b)
                    .collect();
                let probabilities = softmax(&logits)?;
                let winner = argmax(&probabilities)?;
                Some(HealthState::from_class(
                    model.classes[winner],
                    Some(probabilities),
                ))
            }
            ModelParams::NearestCentroid { centroids } => {
                let distances: Vec<f64> =
                    centroids.iter().map(|c| squared_distance(c, &x)).collect();
                let winner = argmin(&distances)?;
                Some(HealthState::from_class(model.classes[winner], None))
            }
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Numerically stable softmax. Returns `None` on degenerate input.
fn softmax(logits: &[f64]) -> Option<Vec<f64>> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }
    Some(exps.into_iter().map(|e| e / sum).collect())
}

fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
