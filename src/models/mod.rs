//! Model artifact, classifiers and the scoring pipeline

pub mod artifact;
pub mod classifier;
pub mod normal_ranges;
pub mod onnx;
pub mod pipeline;
pub mod scaler;

pub use artifact::ModelArtifact;
pub use classifier::{ClassEncoding, Classifier, LogisticRegression};
pub use normal_ranges::{in_normal_range, NormalRange, NormalRangeTable};
pub use pipeline::{score, RiskScorer};
pub use scaler::StandardScaler;
