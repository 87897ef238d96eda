//! Risk assessment result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary diagnosis label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisClass {
    Benign,
    Malignant,
}

impl DiagnosisClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisClass::Benign => "benign",
            DiagnosisClass::Malignant => "malignant",
        }
    }
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Determine risk level from the malignant-class probability.
    ///
    /// Each band is closed below and open above, except `High` which runs to 1.0.
    pub fn from_probability(probability: f64, thresholds: &RiskLevelThresholds) -> Self {
        if probability >= thresholds.high {
            RiskLevel::High
        } else if probability >= thresholds.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Display label, e.g. "Moderate Risk"
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Traffic-light marker shown next to the label
    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Moderate => "🟡",
            RiskLevel::High => "🔴",
        }
    }

    pub fn all() -> [RiskLevel; 3] {
        [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High]
    }
}

/// Lower bounds of the `Moderate` and `High` bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl RiskLevelThresholds {
    /// Check that the bands partition [0, 1] into three non-empty intervals.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.moderate > 0.0 && self.moderate < self.high && self.high <= 1.0) {
            return Err(format!(
                "risk thresholds must satisfy 0 < moderate < high <= 1 (moderate={}, high={})",
                self.moderate, self.high
            ));
        }
        Ok(())
    }
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.30,
            high: 0.70,
        }
    }
}

/// Bucket a probability with the default thresholds.
pub fn categorize(probability: f64) -> RiskLevel {
    RiskLevel::from_probability(probability, &RiskLevelThresholds::default())
}

/// Output of the scoring pipeline for one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub predicted_class: DiagnosisClass,
    /// Probability of the malignant class (0.0 - 1.0)
    pub probability_malignant: f64,
    pub risk_level: RiskLevel,
    pub risk_icon: String,
}

impl ScoringResult {
    /// Probability as a percentage with one decimal place, e.g. "87.3%"
    pub fn probability_percent(&self) -> String {
        format_percent(self.probability_malignant)
    }
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Coloured band of the risk gauge, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: String,
}

/// Everything a presentation layer needs to draw the risk gauge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    /// Probability scaled to 0 - 100
    pub value: f64,
    /// Delta reference point
    pub reference: f64,
    pub bands: Vec<GaugeBand>,
    /// Alert marker position
    pub threshold: f64,
}

impl GaugeReading {
    pub fn new(probability: f64, thresholds: &RiskLevelThresholds) -> Self {
        let moderate = thresholds.moderate * 100.0;
        let high = thresholds.high * 100.0;
        Self {
            value: probability * 100.0,
            reference: 50.0,
            bands: vec![
                GaugeBand {
                    from: 0.0,
                    to: moderate,
                    color: "lightgreen".to_string(),
                },
                GaugeBand {
                    from: moderate,
                    to: high,
                    color: "yellow".to_string(),
                },
                GaugeBand {
                    from: high,
                    to: 100.0,
                    color: "red".to_string(),
                },
            ],
            threshold: 90.0,
        }
    }
}

/// Normal-range annotation for one submitted feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFlag {
    pub feature: String,
    pub value: f64,
    pub in_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
}

/// Model identity shown alongside a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_name: String,
    pub accuracy: f64,
}

/// Presentation payload returned for an assessment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Generation timestamp
    pub timestamp: DateTime<Utc>,

    pub result: ScoringResult,

    /// Display label of the risk level
    pub risk_label: String,

    /// Probability formatted with one decimal, e.g. "12.5%"
    pub probability_percent: String,

    /// Result card headline
    pub message: String,

    pub gauge: GaugeReading,

    /// Per-feature normal-range annotations
    pub range_flags: Vec<RangeFlag>,

    pub model: ModelSummary,
}

impl AssessmentReport {
    pub fn new(
        result: ScoringResult,
        model: ModelSummary,
        thresholds: &RiskLevelThresholds,
    ) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            risk_label: result.risk_level.label().to_string(),
            probability_percent: result.probability_percent(),
            message: crate::guidance::headline(result.risk_level).to_string(),
            gauge: GaugeReading::new(result.probability_malignant, thresholds),
            result,
            range_flags: Vec::new(),
            model,
        }
    }

    /// Attach normal-range annotations
    pub fn with_range_flags(mut self, flags: Vec<RangeFlag>) -> Self {
        self.range_flags = flags;
        self
    }

    /// Number of submitted features outside their reference interval
    pub fn out_of_range_count(&self) -> usize {
        self.range_flags.iter().filter(|f| !f.in_range).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_bands() {
        for p in [0.0, 0.1, 0.25, 0.2999999] {
            assert_eq!(categorize(p), RiskLevel::Low, "p = {p}");
        }
        for p in [0.30, 0.45, 0.5, 0.6999999] {
            assert_eq!(categorize(p), RiskLevel::Moderate, "p = {p}");
        }
        for p in [0.70, 0.85, 0.99, 1.0] {
            assert_eq!(categorize(p), RiskLevel::High, "p = {p}");
        }
    }

    #[test]
    fn test_risk_level_boundaries_are_exact() {
        assert_eq!(categorize(0.30), RiskLevel::Moderate);
        assert_eq!(categorize(0.70), RiskLevel::High);
        assert_eq!(categorize(0.2999999), RiskLevel::Low);
        assert_eq!(categorize(0.6999999), RiskLevel::Moderate);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskLevelThresholds {
            moderate: 0.2,
            high: 0.5,
        };
        assert_eq!(RiskLevel::from_probability(0.19, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.2, &thresholds), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.5, &thresholds), RiskLevel::High);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(RiskLevelThresholds::default().validate().is_ok());
        assert!(RiskLevelThresholds { moderate: 0.7, high: 0.3 }.validate().is_err());
        assert!(RiskLevelThresholds { moderate: 0.0, high: 0.5 }.validate().is_err());
        assert!(RiskLevelThresholds { moderate: 0.3, high: 1.5 }.validate().is_err());
    }

    #[test]
    fn test_labels_and_icons() {
        assert_eq!(RiskLevel::Low.label(), "Low Risk");
        assert_eq!(RiskLevel::Moderate.label(), "Moderate Risk");
        assert_eq!(RiskLevel::High.label(), "High Risk");
        assert_eq!(RiskLevel::High.icon(), "🔴");
    }

    #[test]
    fn test_probability_percent() {
        let result = ScoringResult {
            predicted_class: DiagnosisClass::Malignant,
            probability_malignant: 0.8734,
            risk_level: RiskLevel::High,
            risk_icon: RiskLevel::High.icon().to_string(),
        };
        assert_eq!(result.probability_percent(), "87.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(1.0), "100.0%");
    }

    #[test]
    fn test_gauge_reading() {
        let gauge = GaugeReading::new(0.42, &RiskLevelThresholds::default());
        assert!((gauge.value - 42.0).abs() < 1e-9);
        assert_eq!(gauge.bands.len(), 3);
        assert!((gauge.bands[0].to - 30.0).abs() < 1e-9);
        assert!((gauge.bands[1].to - 70.0).abs() < 1e-9);
        assert_eq!(gauge.bands[2].color, "red");
        assert_eq!(gauge.threshold, 90.0);
    }

    #[test]
    fn test_report_serialization() {
        let result = ScoringResult {
            predicted_class: DiagnosisClass::Benign,
            probability_malignant: 0.12,
            risk_level: RiskLevel::Low,
            risk_icon: RiskLevel::Low.icon().to_string(),
        };
        let report = AssessmentReport::new(
            result,
            ModelSummary {
                model_name: "Logistic Regression".to_string(),
                accuracy: 0.97,
            },
            &RiskLevelThresholds::default(),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["result"]["risk_level"], "low");
        assert_eq!(json["result"]["predicted_class"], "benign");
        assert_eq!(json["probability_percent"], "12.0%");
        assert_eq!(json["risk_label"], "Low Risk");
    }
}
