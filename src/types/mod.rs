//! Type definitions for the risk assessment service

pub mod assessment;
pub mod features;

pub use assessment::{
    categorize, AssessmentReport, DiagnosisClass, GaugeReading, ModelSummary, RangeFlag,
    RiskLevel, RiskLevelThresholds, ScoringResult,
};
pub use features::FeatureVector;
