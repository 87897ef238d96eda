//! Per-feature standardization fitted at training time

use crate::error::{ArtifactError, ScoringError};
use serde::{Deserialize, Serialize};

/// Affine standardization `(x - mean_i) / scale_i`.
///
/// Holds only the fitted statistics, never request state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check that both parameter vectors line up and every divisor is usable.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean[{i}] is not finite"
            )));
        }
        if let Some(i) = self
            .scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(ArtifactError::Invalid(format!(
                "scaler scale[{i}] must be finite and non-zero"
            )));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one ordered feature vector.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if values.len() != self.n_features() {
            return Err(ScoringError::LengthMismatch {
                expected: self.n_features(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(vec![10.0, 0.5], vec![2.0, 0.25]).unwrap();
        let scaled = scaler.transform(&[14.0, 0.25]).unwrap();
        assert_eq!(scaled, vec![2.0, -1.0]);
    }

    #[test]
    fn test_transform_rejects_wrong_length() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0, 2.0]),
            Err(ScoringError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(scaler.transform(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn test_rejects_zero_scale() {
        assert!(StandardScaler::new(vec![0.0, 0.0], vec![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_parameters() {
        assert!(StandardScaler::new(vec![0.0, 0.0], vec![1.0]).is_err());
    }
}
