//! Serialized model artifacts
//!
//! Training exports a JSON document tagged by `kind`:
//!
//! ```json
//! { "kind": "logistic", "feature_names": ["amount", "hour"],
//!   "coefficients": [0.00001, -0.02], "intercept": -1.5 }
//! ```
//!
//! Tree ensembles store each tree as a flat node list rooted at index 0.
//! A split sends `x[feature] < threshold` to `left`, everything else
//! (including NaN) to `right`. Children always point forward, so
//! evaluation terminates.

use super::{ensure_finite, Classifier, Regressor};
use crate::features::FeatureVector;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Any supported artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Logistic regression classifier
    Logistic(LogisticModel),
    /// Linear regressor
    Linear(LinearModel),
    /// Gradient boosted trees or random forest
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Feature names the artifact was trained on, in order
    pub fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Logistic(m) => &m.feature_names,
            ModelArtifact::Linear(m) => &m.feature_names,
            ModelArtifact::TreeEnsemble(m) => &m.feature_names,
        }
    }

    /// Short name of the artifact kind
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Logistic(_) => "logistic",
            ModelArtifact::Linear(_) => "linear",
            ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ModelArtifact::Logistic(m) => {
                check_coefficients(&m.feature_names, &m.coefficients, m.intercept)
            }
            ModelArtifact::Linear(m) => {
                check_coefficients(&m.feature_names, &m.coefficients, m.intercept)
            }
            ModelArtifact::TreeEnsemble(m) => m.validate(),
        }
    }

    /// Use the artifact as a classifier, if its kind allows it. Only
    /// called on validated artifacts.
    pub(crate) fn into_classifier(self) -> Option<Arc<dyn Classifier>> {
        match self {
            ModelArtifact::Logistic(m) => Some(Arc::new(m)),
            ModelArtifact::TreeEnsemble(m) => Some(Arc::new(m)),
            ModelArtifact::Linear(_) => None,
        }
    }

    /// Use the artifact as a regressor, if its kind allows it
    pub(crate) fn into_regressor(self) -> Option<Arc<dyn Regressor>> {
        match self {
            ModelArtifact::Linear(m) => Some(Arc::new(m)),
            ModelArtifact::TreeEnsemble(m) => Some(Arc::new(m)),
            ModelArtifact::Logistic(_) => None,
        }
    }
}

fn check_coefficients(
    feature_names: &[String],
    coefficients: &[f64],
    intercept: f64,
) -> std::result::Result<(), String> {
    if coefficients.len() != feature_names.len() {
        return Err(format!(
            "{} coefficients for {} features",
            coefficients.len(),
            feature_names.len()
        ));
    }
    if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
        return Err("non-finite coefficient".to_string());
    }
    Ok(())
}

fn dot(coefficients: &[f64], features: &FeatureVector) -> Result<f64> {
    if coefficients.len() != features.len() {
        return Err(Error::Model(format!(
            "expected {} features, got {}",
            coefficients.len(),
            features.len()
        )));
    }
    Ok(coefficients
        .iter()
        .zip(features.as_slice())
        .map(|(c, x)| c * x)
        .sum())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Training feature order
    pub feature_names: Vec<String>,
    /// One weight per feature
    pub coefficients: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        let z = self.intercept + dot(&self.coefficients, features)?;
        ensure_finite(sigmoid(z), "logistic model")
    }
}

/// Linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Training feature order
    pub feature_names: Vec<String>,
    /// One weight per feature
    pub coefficients: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let y = self.intercept + dot(&self.coefficients, features)?;
        ensure_finite(y, "linear model")
    }
}

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Boosting: add tree outputs
    #[default]
    Sum,
    /// Bagging: average tree outputs
    Mean,
}

/// Output transform applied after aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    /// Raw value
    #[default]
    Identity,
    /// Sigmoid, for log-odds outputs
    Logistic,
}

/// A single tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Internal split
    Split {
        /// Feature index
        feature: usize,
        /// Split point
        threshold: f64,
        /// Node taken when `x < threshold`
        left: usize,
        /// Node taken otherwise
        right: usize,
    },
    /// Terminal value
    Leaf {
        /// Leaf output
        leaf: f64,
    },
}

/// Decision tree as a flat node list, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Nodes
    pub nodes: Vec<Node>,
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> Result<f64> {
        let mut idx = 0;
        loop {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| Error::Model(format!("tree has no node {}", idx)))?;
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = x.get(*feature).ok_or_else(|| {
                        Error::Model(format!("node {} splits on missing feature {}", idx, feature))
                    })?;
                    let next = if *value < *threshold { *left } else { *right };
                    // Children point forward, otherwise the walk may not end
                    if next <= idx {
                        return Err(Error::Model(format!(
                            "node {} has backward child {}",
                            idx, next
                        )));
                    }
                    idx = next;
                }
                Node::Leaf { leaf } => return Ok(*leaf),
            }
        }
    }

    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                Node::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {} has a non-finite leaf", idx));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tree ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Training feature order
    pub feature_names: Vec<String>,
    /// Trees
    pub trees: Vec<Tree>,
    /// Added to the aggregated tree output
    #[serde(default)]
    pub base_score: f64,
    /// Tree combination
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Output transform
    #[serde(default)]
    pub link: Link,
}

impl TreeEnsemble {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("non-finite base score".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Aggregate tree outputs and apply the link
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(Error::Model(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }

        let x = features.as_slice();
        let total = self
            .trees
            .iter()
            .map(|t| t.evaluate(x))
            .sum::<Result<f64>>()?;
        let raw = match self.aggregation {
            Aggregation::Sum => self.base_score + total,
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
        };

        let value = match self.link {
            Link::Identity => raw,
            Link::Logistic => sigmoid(raw),
        };
        ensure_finite(value, "tree ensemble")
    }
}

impl Classifier for TreeEnsemble {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        self.evaluate(features)
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.evaluate(features)
    }
}
