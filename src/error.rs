//! Domain errors for scoring and artifact loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scoring a single assessment request.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid input: expected {expected} feature values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid input: missing feature `{0}`")]
    MissingFeature(String),

    #[error("invalid input: unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("invalid input: feature `{name}` is not a finite number")]
    NonFiniteValue { name: String },

    #[error("model inference failed: {0}")]
    Inference(String),
}

impl ScoringError {
    /// True for errors caused by the caller's feature vector rather than the model.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ScoringError::Inference(_))
    }
}

/// Errors raised while loading the model artifact or the normal-range table.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("onnx runtime error: {0}")]
    Onnx(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(ScoringError::LengthMismatch {
            expected: 20,
            actual: 19
        }
        .is_invalid_input());
        assert!(ScoringError::MissingFeature("area_mean".into()).is_invalid_input());
        assert!(ScoringError::UnknownFeature("age".into()).is_invalid_input());
        assert!(ScoringError::NonFiniteValue {
            name: "radius_mean".into()
        }
        .is_invalid_input());
        assert!(!ScoringError::Inference("session poisoned".into()).is_invalid_input());
    }

    #[test]
    fn test_error_messages() {
        let err = ScoringError::LengthMismatch {
            expected: 20,
            actual: 21,
        };
        assert_eq!(
            err.to_string(),
            "invalid input: expected 20 feature values, got 21"
        );
    }
}
