//! Combined risk aggregation
//!
//! Derives the credit and fraud inputs from a single feature set, runs
//! both scorers and blends their outputs with an amount band:
//!
//! `overall = clamp01(0.4 * credit_risk + 0.4 * fraud_risk + 0.2 * amount_risk)`

use crate::credit::CreditScorer;
use crate::features::FeatureSet;
use crate::fraud::FraudScorer;
use crate::metrics;
use crate::{Recommendation, Result, RiskComponents, RiskDecision, RiskLevel};
use std::time::Instant;
use tracing::{debug, warn};

/// Weight of the credit component
pub const CREDIT_WEIGHT: f64 = 0.4;
/// Weight of the fraud component
pub const FRAUD_WEIGHT: f64 = 0.4;
/// Weight of the amount component
pub const AMOUNT_WEIGHT: f64 = 0.2;

/// Credit scale used to turn a score into a risk
const CREDIT_SCALE: f64 = 850.0;

/// Credit inputs and their defaults
const CREDIT_DEFAULTS: [(&str, f64); 9] = [
    ("account_age_days", 365.0),
    ("monthly_income", 50_000.0),
    ("total_balance", 100_000.0),
    ("transaction_count_30d", 10.0),
    ("delinquency_count", 0.0),
    ("loan_history_count", 0.0),
    ("avg_transaction_amount", 10_000.0),
    ("credit_utilization", 0.3),
    ("savings_ratio", 0.2),
];

/// Raw fraud inputs and their defaults
const FRAUD_DEFAULTS: [(&str, f64); 9] = [
    ("amount", 0.0),
    ("hour", 12.0),
    ("day_of_week", 3.0),
    ("transaction_count_24h", 0.0),
    ("transaction_count_7d", 5.0),
    ("avg_amount_7d", 10_000.0),
    ("beneficiary_age_days", 365.0),
    ("device_risk", 0.0),
    ("location_risk", 0.0),
];

/// Risk aggregator
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    credit: CreditScorer,
    fraud: FraudScorer,
}

impl RiskAggregator {
    /// Create an aggregator over the two scorers
    pub fn new(credit: CreditScorer, fraud: FraudScorer) -> Self {
        Self { credit, fraud }
    }

    /// Produce a combined decision
    pub fn predict(&self, features: &FeatureSet) -> Result<RiskDecision> {
        let start = Instant::now();
        let decision = self.evaluate(features);

        match &decision {
            Ok(decision) => {
                metrics::PREDICTIONS_TOTAL
                    .with_label_values(&["risk", "composite"])
                    .inc();
                metrics::PREDICTION_DURATION
                    .with_label_values(&["risk"])
                    .observe(start.elapsed().as_secs_f64());
                debug!(
                    overall_risk_score = decision.overall_risk_score,
                    risk_category = ?decision.risk_category,
                    recommendation = %decision.recommendation,
                    "Risk decision calculated"
                );
            }
            Err(e) => {
                metrics::PREDICTION_ERRORS_TOTAL.with_label_values(&["risk"]).inc();
                warn!(error = %e, "Risk prediction failed");
            }
        }

        decision
    }

    /// Score many feature sets, one result per input
    pub fn predict_batch(&self, batch: &[FeatureSet]) -> Vec<Result<RiskDecision>> {
        batch.iter().map(|features| self.predict(features)).collect()
    }

    fn evaluate(&self, features: &FeatureSet) -> Result<RiskDecision> {
        let credit_features = credit_features(features)?;
        let fraud_features = fraud_features(features)?;

        let credit_score = self.credit.predict(&credit_features)?.credit_score;
        let fraud_score = self.fraud.predict(&fraud_features)?.fraud_score;

        let amount = features.get_or("amount", 0.0)?;
        let components = RiskComponents {
            credit_risk: 1.0 - credit_score as f64 / CREDIT_SCALE,
            fraud_risk: fraud_score,
            amount_risk: amount_risk(amount),
        };

        let overall = combine(&components);

        Ok(RiskDecision {
            overall_risk_score: overall,
            risk_category: RiskLevel::from_overall_risk(overall),
            components,
            credit_score,
            fraud_score,
            recommendation: Recommendation::from_overall_risk(overall),
        })
    }
}

/// Amount band risk, strict `>` edges
pub fn amount_risk(amount: f64) -> f64 {
    if amount > 200_000.0 {
        0.8
    } else if amount > 100_000.0 {
        0.5
    } else if amount > 50_000.0 {
        0.3
    } else {
        0.1
    }
}

/// Weighted blend of the components, clamped to [0, 1]
pub fn combine(components: &RiskComponents) -> f64 {
    let overall = components.credit_risk * CREDIT_WEIGHT
        + components.fraud_risk * FRAUD_WEIGHT
        + components.amount_risk * AMOUNT_WEIGHT;
    overall.clamp(0.0, 1.0)
}

/// Credit subset with defaults applied
pub fn credit_features(features: &FeatureSet) -> Result<FeatureSet> {
    let mut subset = FeatureSet::new();
    for (name, default) in CREDIT_DEFAULTS {
        subset.insert(name, features.get_or(name, default)?);
    }
    Ok(subset)
}

/// Fraud subset with defaults applied and the derived signals added
pub fn fraud_features(features: &FeatureSet) -> Result<FeatureSet> {
    let mut subset = FeatureSet::new();
    for (name, default) in FRAUD_DEFAULTS {
        subset.insert(name, features.get_or(name, default)?);
    }

    let get = |name: &str| subset.get_or(name, 0.0);
    let amount = get("amount")?;
    let hour = get("hour")?;
    let avg_amount = get("avg_amount_7d")?;
    let beneficiary_age = get("beneficiary_age_days")?;
    let txn_count_24h = get("transaction_count_24h")?;

    let user_account_age = features.get_or("account_age_days", 365.0)?;
    let user_balance = features.get_or("total_balance", 100_000.0)?;
    let is_new_beneficiary = if beneficiary_age < 7.0 { 1.0 } else { 0.0 };
    let is_unusual_hour = if hour < 6.0 || hour > 23.0 { 1.0 } else { 0.0 };
    let amount_vs_avg_ratio = amount / avg_amount.max(1.0);
    let velocity_score = (txn_count_24h / 10.0).min(1.0);

    subset.insert("user_account_age_days", user_account_age);
    subset.insert("user_balance", user_balance);
    subset.insert("is_new_beneficiary", is_new_beneficiary);
    subset.insert("is_unusual_hour", is_unusual_hour);
    subset.insert("amount_vs_avg_ratio", amount_vs_avg_ratio);
    subset.insert("velocity_score", velocity_score);

    Ok(subset)
}
