//! Model registry
//!
//! Built once at startup and shared read-only by every request. Load
//! failures are absorbed here: a scorer whose artifact is unavailable is
//! handed [`ModelSlot::Unavailable`] and runs its rules until restart.

use super::loader::{LoadResult, ModelLoader};
use super::{Classifier, ModelSlot, Regressor};
use crate::config::ModelsConfig;
use crate::credit::CREDIT_FEATURES;
use crate::fraud::FRAUD_FEATURES;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Holder of the optional trained artifacts
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    fraud: ModelSlot<dyn Classifier>,
    credit: ModelSlot<dyn Regressor>,
}

impl ModelRegistry {
    /// Load every configured artifact, falling back per model on failure
    pub fn load(config: &ModelsConfig) -> Self {
        let loader = ModelLoader::new();

        let fraud = into_slot(
            "fraud_detection",
            loader.load_classifier(&config.fraud_model_path, &FRAUD_FEATURES),
        );
        let credit = into_slot(
            "credit_scoring",
            loader.load_regressor(&config.credit_model_path, &CREDIT_FEATURES),
        );

        let registry = Self { fraud, credit };
        registry.publish_status();
        registry
    }

    /// Registry with no models, every scorer uses its rules
    pub fn fallback_only() -> Self {
        Self {
            fraud: ModelSlot::Unavailable("no fraud model configured".to_string()),
            credit: ModelSlot::Unavailable("no credit model configured".to_string()),
        }
    }

    /// Replace the fraud model
    pub fn with_fraud_model(mut self, model: Arc<dyn Classifier>) -> Self {
        self.fraud = ModelSlot::Loaded(model);
        self
    }

    /// Replace the credit model
    pub fn with_credit_model(mut self, model: Arc<dyn Regressor>) -> Self {
        self.credit = ModelSlot::Loaded(model);
        self
    }

    /// Fraud model slot
    pub fn fraud_model(&self) -> &ModelSlot<dyn Classifier> {
        &self.fraud
    }

    /// Credit model slot
    pub fn credit_model(&self) -> &ModelSlot<dyn Regressor> {
        &self.credit
    }

    /// Readiness for the probe endpoint
    pub fn readiness(&self) -> ReadinessReport {
        ReadinessReport {
            status: "ready".to_string(),
            models: ModelStatuses {
                fraud_detection: ModelStatus::of(&self.fraud),
                credit_scoring: ModelStatus::of(&self.credit),
                // Composed from the other two, always servable
                risk_scoring: ModelStatus::Available,
            },
            fraud_model_loaded: self.fraud.is_loaded(),
            credit_model_loaded: self.credit.is_loaded(),
        }
    }

    fn publish_status(&self) {
        metrics::MODEL_LOADED
            .with_label_values(&["fraud_detection"])
            .set(self.fraud.is_loaded() as i64);
        metrics::MODEL_LOADED
            .with_label_values(&["credit_scoring"])
            .set(self.credit.is_loaded() as i64);
    }
}

fn into_slot<M: ?Sized>(name: &str, result: LoadResult<Arc<M>>) -> ModelSlot<M> {
    match result {
        Ok(model) => {
            info!(model = %name, "Using trained model");
            ModelSlot::Loaded(model)
        }
        Err(e) => {
            warn!(model = %name, error = %e, "Model unavailable, using rule-based scoring");
            ModelSlot::Unavailable(e.to_string())
        }
    }
}

/// Serving mode of one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Trained model loaded
    Available,
    /// Rule-based scoring in use
    Fallback,
}

impl ModelStatus {
    fn of<M: ?Sized>(slot: &ModelSlot<M>) -> Self {
        if slot.is_loaded() {
            ModelStatus::Available
        } else {
            ModelStatus::Fallback
        }
    }
}

/// Per-model statuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatuses {
    /// Fraud classifier
    pub fraud_detection: ModelStatus,
    /// Credit regressor
    pub credit_scoring: ModelStatus,
    /// Combined risk aggregation
    pub risk_scoring: ModelStatus,
}

/// Readiness probe payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// Always "ready" once the registry exists
    pub status: String,
    /// Per-model statuses
    pub models: ModelStatuses,
    /// Whether a real fraud model is loaded
    pub fraud_model_loaded: bool,
    /// Whether a real credit model is loaded
    pub credit_model_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;

    struct Constant(f64);

    impl Classifier for Constant {
        fn predict_proba(&self, _: &FeatureVector) -> crate::Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_missing_artifacts_fall_back() {
        let config = ModelsConfig {
            fraud_model_path: PathBuf::from("/nonexistent/fraud.json"),
            credit_model_path: PathBuf::from("/nonexistent/credit.json"),
        };
        let registry = ModelRegistry::load(&config);

        assert!(!registry.fraud_model().is_loaded());
        assert!(!registry.credit_model().is_loaded());

        let report = registry.readiness();
        assert_eq!(report.models.fraud_detection, ModelStatus::Fallback);
        assert_eq!(report.models.risk_scoring, ModelStatus::Available);
        assert!(!report.fraud_model_loaded);
    }

    #[test]
    fn test_loads_valid_credit_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let credit_path = dir.path().join("credit.json");
        let coefficients = vec![0.0; CREDIT_FEATURES.len()];
        let mut file = std::fs::File::create(&credit_path).unwrap();
        write!(
            file,
            "{}",
            json!({
                "kind": "linear",
                "feature_names": CREDIT_FEATURES,
                "coefficients": coefficients,
                "intercept": 720.0
            })
        )
        .unwrap();

        let config = ModelsConfig {
            fraud_model_path: dir.path().join("fraud.json"),
            credit_model_path: credit_path,
        };
        let registry = ModelRegistry::load(&config);

        assert!(registry.credit_model().is_loaded());
        assert!(!registry.fraud_model().is_loaded());

        let report = registry.readiness();
        assert_eq!(report.models.credit_scoring, ModelStatus::Available);
        assert_eq!(report.models.fraud_detection, ModelStatus::Fallback);
    }

    #[test]
    fn test_injected_model() {
        let registry = ModelRegistry::fallback_only().with_fraud_model(Arc::new(Constant(0.9)));
        assert!(registry.readiness().fraud_model_loaded);
        assert!(!registry.readiness().credit_model_loaded);

        let json = serde_json::to_value(registry.readiness()).unwrap();
        assert_eq!(json["models"]["fraud_detection"], "available");
        assert_eq!(json["models"]["credit_scoring"], "fallback");
    }
}
