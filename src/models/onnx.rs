//! ONNX Runtime backed classifier

use crate::error::{ArtifactError, ScoringError};
use crate::models::classifier::{ClassEncoding, Classifier};
use crate::types::DiagnosisClass;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Loader for ONNX classifier files
pub struct OnnxLoader {
    /// Number of intra-op threads per session
    onnx_threads: usize,
}

impl OnnxLoader {
    /// Initialize ONNX Runtime with the given thread count
    pub fn with_threads(onnx_threads: usize) -> Result<Self, ArtifactError> {
        ort::init().commit().map_err(onnx_err)?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a classifier session from file
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        encoding: ClassEncoding,
        n_features: usize,
    ) -> Result<OnnxClassifier, ArtifactError> {
        let path = path.as_ref();
        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX classifier");

        let session = Session::builder()
            .map_err(onnx_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(onnx_err)?
            .with_intra_threads(self.onnx_threads)
            .map_err(onnx_err)?
            .commit_from_file(path)
            .map_err(onnx_err)?;

        let input = session.inputs.first().ok_or_else(|| {
            ArtifactError::Invalid(format!("onnx model {} declares no inputs", path.display()))
        })?;
        check_input_width(input.input_type.tensor_shape().map(|s| &**s), n_features)?;
        let input_name = input.name.clone();

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(input = %input_name, output = %output_name, "ONNX classifier loaded");

        Ok(OnnxClassifier {
            session: Mutex::new(session),
            input_name,
            output_name,
            encoding,
            n_features,
        })
    }
}

/// The last input dimension must match the manifest's feature count.
/// Symbolic (negative) widths are accepted.
fn check_input_width(dims: Option<&[i64]>, n_features: usize) -> Result<(), ArtifactError> {
    let dims =
        dims.ok_or_else(|| ArtifactError::Invalid("onnx model input is not a tensor".to_string()))?;
    match dims.last() {
        Some(&width) if width >= 0 && width as usize != n_features => Err(ArtifactError::Invalid(
            format!("onnx model expects {width} features but artifact lists {n_features}"),
        )),
        _ => Ok(()),
    }
}

fn onnx_err(e: ort::Error) -> ArtifactError {
    ArtifactError::Onnx(e.to_string())
}

fn inference_err(e: impl std::fmt::Display) -> ScoringError {
    ScoringError::Inference(e.to_string())
}

/// Classifier exported to ONNX, e.g. with skl2onnx.
///
/// Running a session needs exclusive access, so it sits behind a mutex; the
/// rest of the artifact stays lock-free.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    encoding: ClassEncoding,
    n_features: usize,
}

impl OnnxClassifier {
    /// Run the session and return per-class probabilities indexed like the encoding
    fn class_probabilities(&self, scaled: &[f64]) -> Result<[f64; 2], ScoringError> {
        if scaled.len() != self.n_features {
            return Err(ScoringError::LengthMismatch {
                expected: self.n_features,
                actual: scaled.len(),
            });
        }

        let shape = vec![1_i64, scaled.len() as i64];
        let data: Vec<f32> = scaled.iter().map(|&x| x as f32).collect();
        let input_tensor = Tensor::from_array((shape, data)).map_err(inference_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ScoringError::Inference(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(inference_err)?;

        self.extract_probabilities(&outputs)
    }

    /// Handles tensor outputs and the seq(map(int64, float)) outputs some converters emit
    fn extract_probabilities(&self, outputs: &SessionOutputs) -> Result<[f64; 2], ScoringError> {
        if let Some(output) = outputs.get(self.output_name.as_str()) {
            if let Some(probs) = self.try_extract(output) {
                return Ok(probs);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(probs) = self.try_extract(&output) {
                debug!(output = %name, "Extracted probabilities from fallback output");
                return Ok(probs);
            }
        }

        warn!(output = %self.output_name, "Could not extract class probabilities");
        Err(ScoringError::Inference(
            "model produced no probability output".to_string(),
        ))
    }

    fn try_extract(&self, output: &DynValue) -> Option<[f64; 2]> {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return probabilities_from_tensor(&dims, data);
        }

        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return extract_from_sequence_map(output).ok();
        }
        None
    }
}

/// `[1, 2]` or `[2]` shaped tensors carry both classes; `[1, 1]` or `[1]`
/// carries the probability of `classes[1]` only.
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Option<[f64; 2]> {
    let width = dims.last().copied().unwrap_or(0);
    match (width, data) {
        (w, [p0, p1, ..]) if w >= 2 => Some([*p0 as f64, *p1 as f64]),
        (1, [p1, ..]) => Some([1.0 - *p1 as f64, *p1 as f64]),
        _ => None,
    }
}

fn extract_from_sequence_map(output: &DynValue) -> Result<[f64; 2], ScoringError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(inference_err)?;
    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(inference_err)?;

    // batch size is always 1
    let map_value = maps
        .first()
        .ok_or_else(|| ScoringError::Inference("empty probability sequence".to_string()))?;
    let kv_pairs = map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(inference_err)?;

    let mut probs = [None, None];
    for (class_id, prob) in &kv_pairs {
        if let Some(slot) = usize::try_from(*class_id)
            .ok()
            .and_then(|i| probs.get_mut(i))
        {
            *slot = Some(*prob as f64);
        }
    }

    match probs {
        [Some(p0), Some(p1)] => Ok([p0, p1]),
        [None, Some(p1)] => Ok([1.0 - p1, p1]),
        [Some(p0), None] => Ok([p0, 1.0 - p0]),
        [None, None] => Err(ScoringError::Inference(
            "no class probability in output map".to_string(),
        )),
    }
}

impl OnnxClassifier {
    fn label_for(&self, probs: &[f64; 2]) -> Result<DiagnosisClass, ScoringError> {
        let index = usize::from(probs[1] > probs[0]);
        self.encoding
            .label(index)
            .ok_or_else(|| ScoringError::Inference(format!("no class at index {index}")))
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, scaled: &[f64]) -> Result<DiagnosisClass, ScoringError> {
        let probs = self.class_probabilities(scaled)?;
        self.label_for(&probs)
    }

    fn predict_probability(&self, scaled: &[f64]) -> Result<f64, ScoringError> {
        let probs = self.class_probabilities(scaled)?;
        Ok(probs[self.encoding.malignant_index()])
    }

    fn classify(&self, scaled: &[f64]) -> Result<(DiagnosisClass, f64), ScoringError> {
        let probs = self.class_probabilities(scaled)?;
        Ok((self.label_for(&probs)?, probs[self.encoding.malignant_index()]))
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
