//! Fraud scoring
//!
//! With a trained classifier the score is the positive-class probability.
//! Without one, an additive rule score is used:
//!
//! | signal                   | contribution |
//! |--------------------------|--------------|
//! | amount > 200k / 100k / 50k | 0.4 / 0.2 / 0.1 |
//! | beneficiary younger than 7 days | 0.3 |
//! | more than 10 / 5 transactions in 24h | 0.3 / 0.15 |
//! | device risk, location risk | 0.1 each, scaled |

use crate::config::ScoringConfig;
use crate::features::{FeatureSet, FeatureVector};
use crate::metrics;
use crate::model::{ensure_finite, Classifier, ModelRegistry, ModelSlot};
use crate::{FraudScoreResult, Result};
use std::time::Instant;
use tracing::debug;

/// Classifier input order
pub const FRAUD_FEATURES: [&str; 15] = [
    "amount",
    "hour",
    "day_of_week",
    "transaction_count_24h",
    "transaction_count_7d",
    "avg_amount_7d",
    "beneficiary_age_days",
    "device_risk",
    "location_risk",
    "user_account_age_days",
    "user_balance",
    "is_new_beneficiary",
    "is_unusual_hour",
    "amount_vs_avg_ratio",
    "velocity_score",
];

/// Fraud scorer
#[derive(Debug, Clone)]
pub struct FraudScorer {
    model: ModelSlot<dyn Classifier>,
    threshold: f64,
}

impl FraudScorer {
    /// Create a scorer over a model slot
    pub fn new(model: ModelSlot<dyn Classifier>, threshold: f64) -> Self {
        Self { model, threshold }
    }

    /// Create a scorer from the registry
    pub fn from_registry(registry: &ModelRegistry, scoring: &ScoringConfig) -> Self {
        Self::new(registry.fraud_model().clone(), scoring.fraud_threshold)
    }

    /// Whether a trained classifier is serving
    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Fraud threshold in use
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a transaction
    pub fn predict(&self, features: &FeatureSet) -> Result<FraudScoreResult> {
        let start = Instant::now();
        let score = match &self.model {
            ModelSlot::Loaded(model) => FeatureVector::build(features, &FRAUD_FEATURES)
                .and_then(|vector| model.predict_proba(&vector))
                .and_then(|proba| ensure_finite(proba, "fraud model")),
            ModelSlot::Unavailable(_) => rule_score(features),
        };

        let score = match score {
            Ok(score) => score,
            Err(e) => {
                metrics::PREDICTION_ERRORS_TOTAL.with_label_values(&["fraud"]).inc();
                return Err(e);
            }
        };

        let result = FraudScoreResult::from_score(score, self.threshold);

        metrics::PREDICTIONS_TOTAL
            .with_label_values(&["fraud", metrics::mode_label(self.is_model_loaded())])
            .inc();
        metrics::PREDICTION_DURATION
            .with_label_values(&["fraud"])
            .observe(start.elapsed().as_secs_f64());

        debug!(
            fraud_score = result.fraud_score,
            risk_level = ?result.risk_level,
            is_fraud = result.is_fraud,
            model = self.is_model_loaded(),
            "Fraud score calculated"
        );

        Ok(result)
    }
}

/// Additive rule score, clamped to [0, 1]
pub fn rule_score(features: &FeatureSet) -> Result<f64> {
    let amount = features.get_or("amount", 0.0)?;
    let beneficiary_age = features.get_or("beneficiary_age_days", 365.0)?;
    let txn_count_24h = features.get_or("transaction_count_24h", 0.0)?;
    let device_risk = features.get_or("device_risk", 0.0)?;
    let location_risk = features.get_or("location_risk", 0.0)?;

    let mut score = amount_contribution(amount);

    if beneficiary_age < 7.0 {
        score += 0.3;
    }

    if txn_count_24h > 10.0 {
        score += 0.3;
    } else if txn_count_24h > 5.0 {
        score += 0.15;
    }

    score += device_risk * 0.1;
    score += location_risk * 0.1;

    Ok(score.clamp(0.0, 1.0))
}

/// Amount band contribution to the rule score
pub fn amount_contribution(amount: f64) -> f64 {
    if amount > 200_000.0 {
        0.4
    } else if amount > 100_000.0 {
        0.2
    } else if amount > 50_000.0 {
        0.1
    } else {
        0.0
    }
}
