//! Model artifact: fitted classifier, scaler and feature order

use crate::error::ArtifactError;
use crate::models::classifier::{ClassEncoding, Classifier, LogisticRegression};
use crate::models::onnx::OnnxLoader;
use crate::models::scaler::StandardScaler;
use crate::types::ModelSummary;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serialized classifier parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    /// Path is resolved relative to the manifest file
    Onnx { path: PathBuf },
}

/// On-disk artifact layout
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactManifest {
    pub model_name: String,
    pub accuracy: f64,
    pub feature_names: Vec<String>,
    /// Classifier output order; required so the malignant slot is explicit
    pub classes: ClassEncoding,
    pub scaler: StandardScaler,
    pub model: ClassifierSpec,
}

/// Immutable bundle loaded once at startup and shared read-only.
pub struct ModelArtifact {
    classifier: Box<dyn Classifier>,
    scaler: StandardScaler,
    feature_names: Vec<String>,
    model_name: String,
    accuracy: f64,
    classes: ClassEncoding,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("classifier", &self.classifier.kind())
            .field("model_name", &self.model_name)
            .field("accuracy", &self.accuracy)
            .field("n_features", &self.feature_names.len())
            .finish()
    }
}

impl ModelArtifact {
    /// Assemble an artifact from already constructed parts
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: StandardScaler,
        feature_names: Vec<String>,
        model_name: impl Into<String>,
        accuracy: f64,
        classes: ClassEncoding,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            classifier,
            scaler,
            feature_names,
            model_name: model_name.into(),
            accuracy,
            classes,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read and validate a JSON manifest from disk.
    ///
    /// Any failure here is meant to abort startup.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading model artifact");

        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: ArtifactManifest =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let artifact = Self::from_manifest(manifest, base_dir, onnx_threads)?;

        info!(
            model = %artifact.model_name,
            classifier = artifact.classifier.kind(),
            accuracy = artifact.accuracy,
            features = artifact.feature_names.len(),
            "Model artifact loaded"
        );

        Ok(artifact)
    }

    pub fn from_manifest(
        manifest: ArtifactManifest,
        base_dir: &Path,
        onnx_threads: usize,
    ) -> Result<Self, ArtifactError> {
        let n_features = manifest.feature_names.len();
        let classifier: Box<dyn Classifier> = match manifest.model {
            ClassifierSpec::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let model =
                    LogisticRegression::new(coefficients, intercept, manifest.classes.clone())?;
                if model.n_features() != n_features {
                    return Err(ArtifactError::Invalid(format!(
                        "model has {} coefficients for {} features",
                        model.n_features(),
                        n_features
                    )));
                }
                Box::new(model)
            }
            ClassifierSpec::Onnx { path } => {
                let path = base_dir.join(path);
                if !path.is_file() {
                    return Err(ArtifactError::Invalid(format!(
                        "onnx model file not found: {}",
                        path.display()
                    )));
                }
                let loader = OnnxLoader::with_threads(onnx_threads)?;
                Box::new(loader.load(&path, manifest.classes.clone(), n_features)?)
            }
        };

        Self::new(
            classifier,
            manifest.scaler,
            manifest.feature_names,
            manifest.model_name,
            manifest.accuracy,
            manifest.classes,
        )
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_names.is_empty() {
            return Err(ArtifactError::Invalid("feature_names is empty".to_string()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.feature_names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ArtifactError::Invalid(format!(
                "feature `{dup}` listed more than once"
            )));
        }

        self.scaler.validate()?;
        if self.scaler.n_features() != self.feature_names.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler fitted on {} features but artifact lists {}",
                self.scaler.n_features(),
                self.feature_names.len()
            )));
        }

        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ArtifactError::Invalid(format!(
                "accuracy {} outside [0, 1]",
                self.accuracy
            )));
        }

        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn classes(&self) -> &ClassEncoding {
        &self.classes
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            model_name: self.model_name.clone(),
            accuracy: self.accuracy,
        }
    }
}
