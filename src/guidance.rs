//! Static guidance attached to risk levels

use crate::types::RiskLevel;
use serde::Serialize;

pub const MEDICAL_DISCLAIMER: &str = "This tool is for educational purposes only and should \
    not replace professional medical advice. Always consult with healthcare professionals for \
    medical decisions.";

/// Result card headline for a risk level
pub fn headline(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "The analysis suggests a low probability of malignancy.",
        RiskLevel::Moderate | RiskLevel::High => {
            "The analysis suggests elevated risk. Please consult a healthcare professional."
        }
    }
}

/// One titled recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub detail: &'static str,
}

const fn rec(title: &'static str, detail: &'static str) -> Recommendation {
    Recommendation { title, detail }
}

#[rustfmt::skip]
static LOW: [Recommendation; 5] = [
    rec("Continue Regular Screening", "Follow standard mammography guidelines"),
    rec("Maintain Healthy Lifestyle", "Regular exercise, balanced diet"),
    rec("Self-Awareness", "Perform monthly self-examinations"),
    rec("Annual Check-ups", "Regular visits with healthcare provider"),
    rec("Stay Informed", "Keep up with latest screening recommendations"),
];

#[rustfmt::skip]
static MODERATE: [Recommendation; 5] = [
    rec("Enhanced Screening", "Consider more frequent mammograms"),
    rec("Additional Imaging", "Discuss MRI or ultrasound with doctor"),
    rec("Genetic Counseling", "Consider genetic testing if family history"),
    rec("Lifestyle Modifications", "Focus on risk reduction strategies"),
    rec("Close Monitoring", "More frequent clinical breast exams"),
];

#[rustfmt::skip]
static HIGH: [Recommendation; 5] = [
    rec("Immediate Consultation", "See oncologist or breast specialist"),
    rec("Comprehensive Imaging", "MRI, ultrasound, possible biopsy"),
    rec("Genetic Testing", "BRCA1/BRCA2 and other gene panels"),
    rec("Consider Chemoprevention", "Discuss medications with doctor"),
    rec("Intensive Surveillance", "Every 6 months screening"),
];

pub fn recommendations(level: RiskLevel) -> &'static [Recommendation] {
    match level {
        RiskLevel::Low => &LOW,
        RiskLevel::Moderate => &MODERATE,
        RiskLevel::High => &HIGH,
    }
}

/// Recommendations for one level, with the band it covers
#[derive(Debug, Clone, Serialize)]
pub struct LevelGuidance {
    pub risk_level: RiskLevel,
    pub label: &'static str,
    pub icon: &'static str,
    /// Band in percent, e.g. "30-70%"
    pub band: String,
    pub recommendations: &'static [Recommendation],
}

/// Guidance for every level given the configured band boundaries
pub fn all_levels(moderate: f64, high: f64) -> Vec<LevelGuidance> {
    let pct = |p: f64| format!("{}", (p * 100.0).round());
    RiskLevel::all()
        .into_iter()
        .map(|level| {
            let band = match level {
                RiskLevel::Low => format!("0-{}%", pct(moderate)),
                RiskLevel::Moderate => format!("{}-{}%", pct(moderate), pct(high)),
                RiskLevel::High => format!("{}%+", pct(high)),
            };
            LevelGuidance {
                risk_level: level,
                label: level.label(),
                icon: level.icon(),
                band,
                recommendations: recommendations(level),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headlines() {
        assert!(headline(RiskLevel::Low).contains("low probability"));
        assert_eq!(headline(RiskLevel::Moderate), headline(RiskLevel::High));
    }

    #[test]
    fn test_every_level_has_recommendations() {
        for level in RiskLevel::all() {
            assert_eq!(recommendations(level).len(), 5);
        }
        assert_eq!(recommendations(RiskLevel::High)[0].title, "Immediate Consultation");
    }

    #[test]
    fn test_bands() {
        let levels = all_levels(0.3, 0.7);
        let bands: Vec<&str> = levels.iter().map(|l| l.band.as_str()).collect();
        assert_eq!(bands, vec!["0-30%", "30-70%", "70%+"]);
    }
}
