//! Name-keyed cytology feature vectors

use crate::error::ScoringError;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// FNA measurements keyed by feature name.
///
/// Values are bound to model inputs by name. The positional vector the scaler
/// and classifier consume is assembled from the artifact's feature order at
/// scoring time, so field order in a form or request body never matters.
/// Deserializing rejects a name given twice rather than keeping either value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    /// Pair an ordered slice of values with the matching names.
    ///
    /// Rejects a length mismatch instead of truncating or padding.
    pub fn from_ordered<S: AsRef<str>>(
        names: &[S],
        values: &[f64],
    ) -> Result<Self, ScoringError> {
        if names.len() != values.len() {
            return Err(ScoringError::LengthMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(names
            .iter()
            .zip(values)
            .map(|(name, &value)| (name.as_ref().to_string(), value))
            .collect())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .map(|(name, &value)| (name.as_str(), value))
    }

    /// Build the positional vector in `order`.
    ///
    /// Every name in `order` must be present, no extra names may be present and
    /// every value must be finite.
    pub fn assemble<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<f64>, ScoringError> {
        let mut ordered = Vec::with_capacity(order.len());
        for name in order {
            let name = name.as_ref();
            let value = self
                .get(name)
                .ok_or_else(|| ScoringError::MissingFeature(name.to_string()))?;
            if !value.is_finite() {
                return Err(ScoringError::NonFiniteValue {
                    name: name.to_string(),
                });
            }
            ordered.push(value);
        }

        if self.values.len() != order.len() {
            if let Some(unknown) = self
                .values
                .keys()
                .find(|key| !order.iter().any(|name| name.as_ref() == key.as_str()))
            {
                return Err(ScoringError::UnknownFeature(unknown.clone()));
            }
        }

        Ok(ordered)
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeatureVectorVisitor;

        impl<'de> Visitor<'de> for FeatureVectorVisitor {
            type Value = FeatureVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to numeric values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = BTreeMap::new();
                while let Some((name, value)) = map.next_entry::<String, f64>()? {
                    match values.entry(name) {
                        Entry::Vacant(slot) => {
                            slot.insert(value);
                        }
                        Entry::Occupied(slot) => {
                            return Err(de::Error::custom(format_args!(
                                "feature `{}` given more than once",
                                slot.key()
                            )));
                        }
                    }
                }
                Ok(FeatureVector { values })
            }
        }

        deserializer.deserialize_map(FeatureVectorVisitor)
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &[&str] = &["radius_mean", "texture_mean", "area_mean"];

    #[test]
    fn test_assemble_follows_requested_order() {
        let features: FeatureVector = [
            ("area_mean", 655.0),
            ("radius_mean", 14.0),
            ("texture_mean", 19.0),
        ]
        .into_iter()
        .collect();

        let ordered = features.assemble(ORDER).unwrap();
        assert_eq!(ordered, vec![14.0, 19.0, 655.0]);
    }

    #[test]
    fn test_assemble_rejects_missing_feature() {
        let features: FeatureVector = [("radius_mean", 14.0), ("texture_mean", 19.0)]
            .into_iter()
            .collect();

        match features.assemble(ORDER) {
            Err(ScoringError::MissingFeature(name)) => assert_eq!(name, "area_mean"),
            other => panic!("expected missing feature, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_rejects_unknown_feature() {
        let mut features =
            FeatureVector::from_ordered(ORDER, &[14.0, 19.0, 655.0]).unwrap();
        features.insert("age", 52.0);

        match features.assemble(ORDER) {
            Err(ScoringError::UnknownFeature(name)) => assert_eq!(name, "age"),
            other => panic!("expected unknown feature, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_rejects_non_finite() {
        let features =
            FeatureVector::from_ordered(ORDER, &[14.0, f64::NAN, 655.0]).unwrap();
        assert!(matches!(
            features.assemble(ORDER),
            Err(ScoringError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_from_ordered_length_mismatch() {
        let err = FeatureVector::from_ordered(ORDER, &[14.0, 19.0]).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_json_shape() {
        let features: FeatureVector =
            serde_json::from_str(r#"{"radius_mean": 14.0, "area_mean": 655}"#).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.get("area_mean"), Some(655.0));
    }

    #[test]
    fn test_json_rejects_repeated_name() {
        let err = serde_json::from_str::<FeatureVector>(
            r#"{"radius_mean": 40.0, "area_mean": 655, "radius_mean": 12.1}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("radius_mean"));
    }

    #[test]
    fn test_json_rejects_non_numeric_value() {
        let result = serde_json::from_str::<FeatureVector>(r#"{"area_worst": "large"}"#);
        assert!(result.is_err());
    }
}
