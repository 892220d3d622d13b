//! Feature sets and model input vectors
//!
//! A [`FeatureSet`] is the loosely typed mapping handed to the scorers.
//! Values are JSON scalars and are coerced to `f64` on read; a value that
//! cannot be coerced is reported as [`Error::MalformedInput`] instead of
//! being guessed or dropped.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open mapping from feature name to a numeric-ish value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<String, Value>);

impl FeatureSet {
    /// Create an empty feature set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a feature
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder form of [`FeatureSet::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Whether the feature is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a feature as a float; `Ok(None)` when absent
    pub fn get(&self, name: &str) -> Result<Option<f64>> {
        self.0.get(name).map(|v| coerce(name, v)).transpose()
    }

    /// Read a feature as a float, substituting `default` when absent
    pub fn get_or(&self, name: &str, default: f64) -> Result<f64> {
        Ok(self.get(name)?.unwrap_or(default))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

fn coerce(name: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::malformed(name, format!("number {} is not representable", n)))?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::malformed(name, format!("cannot parse '{}' as a number", s)))?,
        // A non-finite f64 inserted through `FeatureSet::insert` lands here as null
        Value::Null => return Err(Error::malformed(name, "expected a number, got null")),
        Value::Array(_) => return Err(Error::malformed(name, "expected a number, got an array")),
        Value::Object(_) => return Err(Error::malformed(name, "expected a number, got an object")),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(Error::malformed(name, "value is not finite"))
    }
}

/// Ordered model input, one entry per declared feature name
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Build the vector for `names`, missing features become `0.0`
    pub fn build(features: &FeatureSet, names: &[&str]) -> Result<Self> {
        let values = names
            .iter()
            .map(|name| features.get_or(name, 0.0))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(values))
    }

    /// Vector values in declared order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coercion() {
        let features: FeatureSet = serde_json::from_value(json!({
            "amount": 1500,
            "hour": "7",
            "device_risk": " 0.25 ",
            "is_new_beneficiary": true,
        }))
        .unwrap();

        assert_eq!(features.get("amount").unwrap(), Some(1500.0));
        assert_eq!(features.get("hour").unwrap(), Some(7.0));
        assert_eq!(features.get("device_risk").unwrap(), Some(0.25));
        assert_eq!(features.get("is_new_beneficiary").unwrap(), Some(1.0));
        assert_eq!(features.get("missing").unwrap(), None);
        assert_eq!(features.get_or("missing", 365.0).unwrap(), 365.0);
    }

    #[test]
    fn test_malformed_values() {
        let features: FeatureSet = serde_json::from_value(json!({
            "amount": "lots",
            "hour": null,
            "tags": [1, 2],
        }))
        .unwrap();

        for name in ["amount", "hour", "tags"] {
            match features.get(name) {
                Err(Error::MalformedInput { feature, .. }) => assert_eq!(feature, name),
                other => panic!("expected malformed input for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_non_finite_strings_rejected() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", " -Infinity "] {
            let features = FeatureSet::new().with("device_risk", raw);
            match features.get("device_risk") {
                Err(Error::MalformedInput { feature, reason }) => {
                    assert_eq!(feature, "device_risk");
                    assert_eq!(reason, "value is not finite");
                }
                other => panic!("expected malformed input for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let features = FeatureSet::new().with("amount", value);
            assert!(matches!(
                features.get("amount"),
                Err(Error::MalformedInput { .. })
            ));
            assert!(features.get_or("amount", 0.0).is_err());
        }
    }

    #[test]
    fn test_implausible_values_accepted() {
        let features = FeatureSet::new().with("account_age_days", -40.0);
        assert_eq!(features.get("account_age_days").unwrap(), Some(-40.0));
    }

    #[test]
    fn test_vector_order_and_defaults() {
        let features: FeatureSet = [("b", 2.0), ("a", 1.0), ("unused", 9.0)]
            .into_iter()
            .collect();

        let vector = FeatureVector::build(&features, &["a", "missing", "b"]).unwrap();
        assert_eq!(vector.as_slice(), &[1.0, 0.0, 2.0]);
        assert_eq!(vector.len(), 3);
    }

    #[test]
    fn test_vector_rejects_malformed() {
        let features = FeatureSet::new().with("a", "x");
        assert!(FeatureVector::build(&features, &["a"]).is_err());
        // Unreferenced malformed keys are not read
        assert!(FeatureVector::build(&features, &["b"]).is_ok());
    }
}
