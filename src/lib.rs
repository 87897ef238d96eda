//! Breast Cancer Risk Assessment Library
//!
//! Scores fine-needle-aspirate cytology measurements with a pre-trained
//! classifier and feature scaler, and buckets the malignant-class probability
//! into Low / Moderate / High risk.

pub mod config;
pub mod error;
pub mod feature_catalog;
pub mod guidance;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, ScoringError};
pub use models::{in_normal_range, score, ModelArtifact, NormalRangeTable, RiskScorer};
pub use types::{categorize, FeatureVector, RiskLevel, ScoringResult};
