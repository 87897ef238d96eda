//! Classifier interface and the built-in logistic regression model

use crate::error::{ArtifactError, ScoringError};
use crate::types::DiagnosisClass;
use serde::{Deserialize, Serialize};

/// The two capabilities the scoring pipeline needs from a fitted model.
///
/// Both operate on an already standardized feature vector.
pub trait Classifier: Send + Sync {
    /// Predicted diagnosis label
    fn predict(&self, scaled: &[f64]) -> Result<DiagnosisClass, ScoringError>;

    /// Probability of the malignant class (0.0 - 1.0)
    fn predict_probability(&self, scaled: &[f64]) -> Result<f64, ScoringError>;

    /// Predicted label and malignant probability from a single evaluation.
    ///
    /// Backends that run an external session override this so each
    /// assessment evaluates the model once.
    fn classify(&self, scaled: &[f64]) -> Result<(DiagnosisClass, f64), ScoringError> {
        Ok((self.predict(scaled)?, self.predict_probability(scaled)?))
    }

    /// Short identifier used in logs
    fn kind(&self) -> &'static str;
}

/// Label encoding the classifier was trained with.
///
/// Index `i` of a probability output belongs to `classes[i]`. Validated at
/// load time so the malignant slot is never a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DiagnosisClass>", into = "Vec<DiagnosisClass>")]
pub struct ClassEncoding {
    classes: [DiagnosisClass; 2],
}

impl ClassEncoding {
    pub fn new(classes: [DiagnosisClass; 2]) -> Result<Self, ArtifactError> {
        if classes[0] == classes[1] {
            return Err(ArtifactError::Invalid(format!(
                "class encoding lists `{}` twice",
                classes[0].as_str()
            )));
        }
        Ok(Self { classes })
    }

    /// Slot of the malignant class in probability outputs
    pub fn malignant_index(&self) -> usize {
        if self.classes[1] == DiagnosisClass::Malignant {
            1
        } else {
            0
        }
    }

    pub fn label(&self, index: usize) -> Option<DiagnosisClass> {
        self.classes.get(index).copied()
    }

    pub fn classes(&self) -> &[DiagnosisClass; 2] {
        &self.classes
    }
}

impl TryFrom<Vec<DiagnosisClass>> for ClassEncoding {
    type Error = ArtifactError;

    fn try_from(classes: Vec<DiagnosisClass>) -> Result<Self, Self::Error> {
        let classes: [DiagnosisClass; 2] = classes.try_into().map_err(|v: Vec<_>| {
            ArtifactError::Invalid(format!(
                "class encoding must list exactly 2 classes, got {}",
                v.len()
            ))
        })?;
        Self::new(classes)
    }
}

impl From<ClassEncoding> for Vec<DiagnosisClass> {
    fn from(encoding: ClassEncoding) -> Self {
        encoding.classes.to_vec()
    }
}

/// Binary logistic regression with scikit-learn semantics.
///
/// `sigmoid(w·x + b)` is the probability of `classes[1]`; the predicted label
/// is `classes[1]` iff the decision value is positive.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    encoding: ClassEncoding,
}

impl LogisticRegression {
    pub fn new(
        coefficients: Vec<f64>,
        intercept: f64,
        encoding: ClassEncoding,
    ) -> Result<Self, ArtifactError> {
        if coefficients.is_empty() {
            return Err(ArtifactError::Invalid(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid(
                "logistic regression parameters must be finite".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
            encoding,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn decision_function(&self, scaled: &[f64]) -> Result<f64, ScoringError> {
        if scaled.len() != self.coefficients.len() {
            return Err(ScoringError::LengthMismatch {
                expected: self.coefficients.len(),
                actual: scaled.len(),
            });
        }
        Ok(self
            .coefficients
            .iter()
            .zip(scaled)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, scaled: &[f64]) -> Result<DiagnosisClass, ScoringError> {
        let index = usize::from(self.decision_function(scaled)? > 0.0);
        self.encoding
            .label(index)
            .ok_or_else(|| ScoringError::Inference(format!("no class at index {index}")))
    }

    fn predict_probability(&self, scaled: &[f64]) -> Result<f64, ScoringError> {
        let p1 = sigmoid(self.decision_function(scaled)?);
        Ok(if self.encoding.malignant_index() == 1 {
            p1
        } else {
            1.0 - p1
        })
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// scikit-learn order for a 0 = benign, 1 = malignant target
    pub(crate) fn benign_first() -> ClassEncoding {
        ClassEncoding::new([DiagnosisClass::Benign, DiagnosisClass::Malignant]).unwrap()
    }

    fn model(encoding: ClassEncoding) -> LogisticRegression {
        LogisticRegression::new(vec![1.0, -2.0], 0.5, encoding).unwrap()
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn test_probability_follows_encoding() {
        let forward = model(benign_first());
        let reversed = model(
            ClassEncoding::new([DiagnosisClass::Malignant, DiagnosisClass::Benign]).unwrap(),
        );

        // decision = 3.0 - 0.0 + 0.5
        let x = [3.0, 0.0];
        let p_forward = forward.predict_probability(&x).unwrap();
        let p_reversed = reversed.predict_probability(&x).unwrap();

        assert!((p_forward - sigmoid(3.5)).abs() < 1e-12);
        assert!((p_reversed - (1.0 - sigmoid(3.5))).abs() < 1e-12);
        assert_eq!(forward.predict(&x).unwrap(), DiagnosisClass::Malignant);
        assert_eq!(reversed.predict(&x).unwrap(), DiagnosisClass::Benign);
    }

    #[test]
    fn test_predict_agrees_with_probability() {
        let m = model(benign_first());
        for x in [[-3.0, 1.0], [0.0, 0.0], [2.0, 0.5], [0.0, 1.0]] {
            let p = m.predict_probability(&x).unwrap();
            let label = m.predict(&x).unwrap();
            assert_eq!(label == DiagnosisClass::Malignant, p > 0.5, "x = {x:?}");
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        let m = model(benign_first());
        assert!(matches!(
            m.predict_probability(&[1.0]),
            Err(ScoringError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_classify_matches_separate_calls() {
        let m = model(benign_first());
        let x = [2.0, 0.5];
        let (label, p) = m.classify(&x).unwrap();
        assert_eq!(label, m.predict(&x).unwrap());
        assert_eq!(p.to_bits(), m.predict_probability(&x).unwrap().to_bits());
    }

    #[test]
    fn test_class_encoding_validation() {
        let parsed: ClassEncoding = serde_json::from_str(r#"["benign", "malignant"]"#).unwrap();
        assert_eq!(parsed.malignant_index(), 1);

        let reversed: ClassEncoding = serde_json::from_str(r#"["malignant", "benign"]"#).unwrap();
        assert_eq!(reversed.malignant_index(), 0);

        assert!(serde_json::from_str::<ClassEncoding>(r#"["benign", "benign"]"#).is_err());
        assert!(serde_json::from_str::<ClassEncoding>(r#"["benign"]"#).is_err());
        assert!(
            serde_json::from_str::<ClassEncoding>(r#"["benign", "malignant", "benign"]"#).is_err()
        );
        assert!(serde_json::from_str::<ClassEncoding>(r#"["benign", "unknown"]"#).is_err());
    }
}
