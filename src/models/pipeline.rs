//! Risk scoring pipeline: features -> scaled vector -> classifier -> risk level

use crate::error::ScoringError;
use crate::models::artifact::ModelArtifact;
use crate::types::{FeatureVector, RiskLevel, RiskLevelThresholds, ScoringResult};
use std::sync::Arc;
use tracing::debug;

/// Score a name-keyed feature vector with the default risk thresholds.
pub fn score(
    features: &FeatureVector,
    artifact: &ModelArtifact,
) -> Result<ScoringResult, ScoringError> {
    let ordered = features.assemble(artifact.feature_names())?;
    score_values(&ordered, artifact, &RiskLevelThresholds::default())
}

fn score_values(
    values: &[f64],
    artifact: &ModelArtifact,
    thresholds: &RiskLevelThresholds,
) -> Result<ScoringResult, ScoringError> {
    if values.len() != artifact.feature_count() {
        return Err(ScoringError::LengthMismatch {
            expected: artifact.feature_count(),
            actual: values.len(),
        });
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ScoringError::NonFiniteValue {
            name: artifact.feature_names()[i].clone(),
        });
    }

    let scaled = artifact.scaler().transform(values)?;

    let classifier = artifact.classifier();
    let (predicted_class, probability) = classifier.classify(&scaled)?;
    if !probability.is_finite() {
        return Err(ScoringError::Inference(format!(
            "{} returned a non-finite probability",
            classifier.kind()
        )));
    }
    let probability_malignant = probability.clamp(0.0, 1.0);

    let risk_level = RiskLevel::from_probability(probability_malignant, thresholds);

    debug!(
        classifier = classifier.kind(),
        predicted_class = predicted_class.as_str(),
        probability_malignant = probability_malignant,
        risk_level = ?risk_level,
        "Scoring complete"
    );

    Ok(ScoringResult {
        predicted_class,
        probability_malignant,
        risk_level,
        risk_icon: risk_level.icon().to_string(),
    })
}

/// Scoring entry point holding the shared artifact and configured thresholds.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    artifact: Arc<ModelArtifact>,
    thresholds: RiskLevelThresholds,
}

impl RiskScorer {
    pub fn new(artifact: Arc<ModelArtifact>, thresholds: RiskLevelThresholds) -> Self {
        Self {
            artifact,
            thresholds,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn thresholds(&self) -> &RiskLevelThresholds {
        &self.thresholds
    }

    /// Score measurements bound by feature name.
    pub fn score(&self, features: &FeatureVector) -> Result<ScoringResult, ScoringError> {
        let ordered = features.assemble(self.artifact.feature_names())?;
        score_values(&ordered, &self.artifact, &self.thresholds)
    }

    /// Score values already in the artifact's feature order.
    ///
    /// The length is checked before anything reaches the scaler.
    pub fn score_ordered(&self, values: &[f64]) -> Result<ScoringResult, ScoringError> {
        score_values(values, &self.artifact, &self.thresholds)
    }
}
