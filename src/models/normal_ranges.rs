//! Reference-population interquartile ranges per feature

use crate::error::ArtifactError;
use crate::types::{FeatureVector, RangeFlag};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// 25th - 75th percentile interval of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub q25: f64,
    pub q75: f64,
}

impl NormalRange {
    /// Inclusive at both ends
    pub fn contains(&self, value: f64) -> bool {
        self.q25 <= value && value <= self.q75
    }
}

/// Immutable feature name -> interval table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalRangeTable {
    ranges: HashMap<String, NormalRange>,
}

impl NormalRangeTable {
    pub fn new(ranges: HashMap<String, NormalRange>) -> Result<Self, ArtifactError> {
        let table = Self { ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Self = serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        table.validate()?;

        info!(path = %path.display(), features = table.len(), "Normal ranges loaded");
        Ok(table)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        for (name, range) in &self.ranges {
            if !range.q25.is_finite() || !range.q75.is_finite() || range.q25 > range.q75 {
                return Err(ArtifactError::Invalid(format!(
                    "normal range for `{name}` must satisfy q25 <= q75 (q25={}, q75={})",
                    range.q25, range.q75
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, feature: &str) -> Option<&NormalRange> {
        self.ranges.get(feature)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Unknown features are treated as normal.
    pub fn in_normal_range(&self, feature: &str, value: f64) -> bool {
        self.get(feature)
            .map_or(true, |range| range.contains(value))
    }

    /// One flag per submitted feature, in name order
    pub fn annotate(&self, features: &FeatureVector) -> Vec<RangeFlag> {
        features
            .iter()
            .map(|(name, value)| {
                let range = self.get(name);
                RangeFlag {
                    feature: name.to_string(),
                    value,
                    in_range: self.in_normal_range(name, value),
                    q25: range.map(|r| r.q25),
                    q75: range.map(|r| r.q75),
                }
            })
            .collect()
    }
}

/// Free-function form of [`NormalRangeTable::in_normal_range`]
pub fn in_normal_range(feature: &str, value: f64, table: &NormalRangeTable) -> bool {
    table.in_normal_range(feature, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NormalRangeTable {
        let mut ranges = HashMap::new();
        ranges.insert(
            "radius_mean".to_string(),
            NormalRange {
                q25: 11.7,
                q75: 15.78,
            },
        );
        NormalRangeTable::new(ranges).unwrap()
    }

    #[test]
    fn test_radius_mean_range() {
        let table = table();
        assert!(in_normal_range("radius_mean", 13.0, &table));
        assert!(!in_normal_range("radius_mean", 9.0, &table));
        assert!(!in_normal_range("radius_mean", 20.0, &table));
        assert!(in_normal_range("radius_mean", 11.7, &table));
        assert!(in_normal_range("radius_mean", 15.78, &table));
    }

    #[test]
    fn test_unknown_feature_is_normal() {
        let table = table();
        for v in [-1.0e9, 0.0, 13.0, 1.0e9, f64::INFINITY] {
            assert!(in_normal_range("cell_count", v, &table));
        }
        assert!(in_normal_range("anything", 5.0, &NormalRangeTable::default()));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut ranges = HashMap::new();
        ranges.insert("area_mean".to_string(), NormalRange { q25: 800.0, q75: 400.0 });
        assert!(NormalRangeTable::new(ranges).is_err());
    }

    #[test]
    fn test_annotate() {
        let table = table();
        let features: FeatureVector = [("radius_mean", 9.0), ("texture_mean", 19.0)]
            .into_iter()
            .collect();

        let flags = table.annotate(&features);
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].feature, "radius_mean");
        assert!(!flags[0].in_range);
        assert_eq!(flags[0].q25, Some(11.7));
        assert!(flags[1].in_range);
        assert_eq!(flags[1].q75, None);
    }

    #[test]
    fn test_parse_json() {
        let table: NormalRangeTable =
            serde_json::from_str(r#"{"area_mean": {"q25": 420.3, "q75": 782.7}}"#).unwrap();
        assert!(table.in_normal_range("area_mean", 500.0));
        assert!(!table.in_normal_range("area_mean", 1000.0));
    }

    #[test]
    fn test_shipped_table_covers_catalog() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts/normal_ranges.json");
        let table = NormalRangeTable::load(path).unwrap();
        for name in crate::feature_catalog::feature_names() {
            assert!(table.get(name).is_some(), "no range for {name}");
        }
        assert_eq!(table.get("radius_mean"), Some(&NormalRange { q25: 11.7, q75: 15.78 }));
    }
}
