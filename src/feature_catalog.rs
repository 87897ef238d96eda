//! Input field catalog for the FNA measurement form.
//!
//! Lists the 20 cytology features in the order the shipped model was trained
//! on, with the labels, advisory input ranges, defaults and step sizes a form
//! needs. Ranges are advisory: the scoring pipeline never enforces them.

use serde::Serialize;

/// Which summary statistic of the sampled cell population a feature holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementGroup {
    /// Average across the sampled cells
    Mean,
    /// Largest observed value, a proxy for the most abnormal cells
    Worst,
}

/// Form metadata for one input feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub group: MeasurementGroup,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

const fn spec(
    name: &'static str,
    label: &'static str,
    group: MeasurementGroup,
    max: f64,
    default: f64,
    step: f64,
) -> FeatureSpec {
    FeatureSpec {
        name,
        label,
        group,
        min: 0.0,
        max,
        default,
        step,
    }
}

use self::MeasurementGroup::{Mean, Worst};

#[rustfmt::skip]
static FEATURES: [FeatureSpec; 20] = [
    // Average cell values (10)
    spec("radius_mean", "Average Cell Radius", Mean, 50.0, 14.0, 0.1),
    spec("texture_mean", "Average Cell Texture", Mean, 50.0, 19.0, 0.1),
    spec("perimeter_mean", "Average Cell Perimeter", Mean, 200.0, 92.0, 0.1),
    spec("area_mean", "Average Cell Area", Mean, 2500.0, 655.0, 1.0),
    spec("smoothness_mean", "Average Cell Smoothness", Mean, 1.0, 0.096, 0.001),
    spec("compactness_mean", "Average Cell Compactness", Mean, 1.0, 0.104, 0.001),
    spec("concavity_mean", "Average Cell Concavity", Mean, 1.0, 0.089, 0.001),
    spec("concave_points_mean", "Average Concave Points", Mean, 1.0, 0.048, 0.001),
    spec("symmetry_mean", "Average Cell Symmetry", Mean, 1.0, 0.181, 0.001),
    spec("fractal_dimension_mean", "Average Fractal Dimension", Mean, 1.0, 0.063, 0.001),
    // Maximum cell values (10)
    spec("radius_worst", "Maximum Cell Radius", Worst, 50.0, 16.0, 0.1),
    spec("texture_worst", "Maximum Cell Texture", Worst, 50.0, 25.0, 0.1),
    spec("perimeter_worst", "Maximum Cell Perimeter", Worst, 300.0, 107.0, 0.1),
    spec("area_worst", "Maximum Cell Area", Worst, 4000.0, 880.0, 1.0),
    spec("smoothness_worst", "Maximum Cell Smoothness", Worst, 1.0, 0.132, 0.001),
    spec("compactness_worst", "Maximum Cell Compactness", Worst, 1.0, 0.254, 0.001),
    spec("concavity_worst", "Maximum Cell Concavity", Worst, 1.0, 0.273, 0.001),
    spec("concave_points_worst", "Maximum Cell Concave Points", Worst, 1.0, 0.114, 0.001),
    spec("symmetry_worst", "Maximum Cell Symmetry", Worst, 1.0, 0.290, 0.001),
    spec("fractal_dimension_worst", "Maximum Cell Fractal Dimension", Worst, 1.0, 0.084, 0.001),
];

/// All feature specs, in training order
pub fn feature_specs() -> &'static [FeatureSpec] {
    &FEATURES
}

/// Feature names in training order
pub fn feature_names() -> Vec<&'static str> {
    FEATURES.iter().map(|f| f.name).collect()
}

pub fn feature_count() -> usize {
    FEATURES.len()
}

/// Form defaults keyed by name
pub fn default_features() -> crate::types::FeatureVector {
    FEATURES.iter().map(|f| (f.name, f.default)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(feature_count(), 20);
        assert_eq!(feature_names().len(), 20);
    }

    #[test]
    fn test_groups_mirror_each_other() {
        let (mean, worst): (Vec<_>, Vec<_>) = feature_specs()
            .iter()
            .partition(|f| f.group == MeasurementGroup::Mean);
        assert_eq!(mean.len(), 10);
        assert_eq!(worst.len(), 10);

        for (m, w) in mean.iter().zip(&worst) {
            assert_eq!(
                m.name.trim_end_matches("_mean"),
                w.name.trim_end_matches("_worst")
            );
        }
    }

    #[test]
    fn test_defaults_within_advisory_range() {
        for f in feature_specs() {
            assert!(
                (f.min..=f.max).contains(&f.default),
                "{} default out of range",
                f.name
            );
        }
    }

    #[test]
    fn test_labels() {
        let area = feature_specs()
            .iter()
            .find(|f| f.name == "area_worst")
            .unwrap();
        assert_eq!(area.max, 4000.0);
        assert_eq!(area.label, "Maximum Cell Area");
    }

    #[test]
    fn test_default_features() {
        let defaults = default_features();
        assert_eq!(defaults.len(), 20);
        assert_eq!(defaults.get("radius_mean"), Some(14.0));
    }
}
