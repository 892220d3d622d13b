//! Credit scoring

use crate::config::ScoringConfig;
use crate::features::{FeatureSet, FeatureVector};
use crate::metrics;
use crate::model::{ensure_finite, ModelRegistry, ModelSlot, Regressor};
use crate::{CreditRiskCategory, CreditScoreResult, Result, ScoreRange};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Regressor input order
pub const CREDIT_FEATURES: [&str; 9] = [
    "account_age_days",
    "monthly_income",
    "total_balance",
    "transaction_count_30d",
    "delinquency_count",
    "loan_history_count",
    "avg_transaction_amount",
    "credit_utilization",
    "savings_ratio",
];

/// Starting point of the rule score
const BASE_SCORE: f64 = 600.0;

/// Credit scorer
#[derive(Debug, Clone)]
pub struct CreditScorer {
    model: ModelSlot<dyn Regressor>,
    min_score: f64,
    max_score: f64,
}

impl CreditScorer {
    /// Create a scorer over a model slot with score bounds
    pub fn new(model: ModelSlot<dyn Regressor>, min_score: i64, max_score: i64) -> Self {
        Self {
            model,
            min_score: min_score as f64,
            max_score: max_score as f64,
        }
    }

    /// Create a scorer from the registry
    pub fn from_registry(registry: &ModelRegistry, scoring: &ScoringConfig) -> Self {
        Self::new(
            registry.credit_model().clone(),
            scoring.credit_score_min,
            scoring.credit_score_max,
        )
    }

    /// Whether a trained regressor is serving
    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Score a customer
    pub fn predict(&self, features: &FeatureSet) -> Result<CreditScoreResult> {
        let start = Instant::now();
        let raw = match &self.model {
            ModelSlot::Loaded(model) => FeatureVector::build(features, &CREDIT_FEATURES)
                .and_then(|vector| model.predict(&vector))
                .and_then(|raw| ensure_finite(raw, "credit model")),
            ModelSlot::Unavailable(_) => rule_score(features),
        };

        let result = raw.and_then(|raw| {
            let score = raw.max(self.min_score).min(self.max_score);
            Ok(CreditScoreResult {
                credit_score: score as i64,
                risk_category: CreditRiskCategory::from_score(score),
                score_range: ScoreRange::from_score(score),
                factors: factor_analysis(features)?,
            })
        });

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                metrics::PREDICTION_ERRORS_TOTAL.with_label_values(&["credit"]).inc();
                return Err(e);
            }
        };

        metrics::PREDICTIONS_TOTAL
            .with_label_values(&["credit", metrics::mode_label(self.is_model_loaded())])
            .inc();
        metrics::PREDICTION_DURATION
            .with_label_values(&["credit"])
            .observe(start.elapsed().as_secs_f64());

        debug!(
            credit_score = result.credit_score,
            risk_category = ?result.risk_category,
            model = self.is_model_loaded(),
            "Credit score calculated"
        );

        Ok(result)
    }
}

/// Additive rule score, before clamping
pub fn rule_score(features: &FeatureSet) -> Result<f64> {
    let account_age = features.get_or("account_age_days", 0.0)?;
    let income = features.get_or("monthly_income", 0.0)?;
    let balance = features.get_or("total_balance", 0.0)?;
    let delinquency = features.get_or("delinquency_count", 0.0)?;
    let loan_history = features.get_or("loan_history_count", 0.0)?;

    let mut score = BASE_SCORE;

    score += if account_age > 365.0 {
        50.0
    } else if account_age > 180.0 {
        30.0
    } else if account_age > 90.0 {
        15.0
    } else {
        0.0
    };

    score += if income > 100_000.0 {
        100.0
    } else if income > 50_000.0 {
        60.0
    } else if income > 25_000.0 {
        30.0
    } else {
        0.0
    };

    score -= delinquency * 20.0;

    if loan_history > 0.0 {
        score += 30.0;
    }

    score += if balance > 100_000.0 {
        50.0
    } else if balance > 50_000.0 {
        30.0
    } else {
        0.0
    };

    Ok(score)
}

/// Explanations from the raw input, independent of the scoring path
pub fn factor_analysis(features: &FeatureSet) -> Result<BTreeMap<String, String>> {
    let mut factors = BTreeMap::new();

    let account_age = features.get_or("account_age_days", 0.0)?;
    if account_age < 90.0 {
        factors.insert(
            "account_age".to_string(),
            "New account - negative impact".to_string(),
        );
    } else if account_age > 365.0 {
        factors.insert(
            "account_age".to_string(),
            "Established account - positive impact".to_string(),
        );
    }

    let delinquency = features.get_or("delinquency_count", 0.0)?;
    if delinquency > 0.0 {
        factors.insert(
            "delinquency".to_string(),
            format!("{} delinquencies - negative impact", delinquency),
        );
    }

    let income = features.get_or("monthly_income", 0.0)?;
    if income > 100_000.0 {
        factors.insert("income".to_string(), "High income - positive impact".to_string());
    } else if income < 25_000.0 {
        factors.insert("income".to_string(), "Low income - negative impact".to_string());
    }

    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Arc;

    struct Fixed(f64);

    impl Regressor for Fixed {
        fn predict(&self, _: &FeatureVector) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn fallback() -> CreditScorer {
        CreditScorer::new(ModelSlot::Unavailable("test".into()), 300, 850)
    }

    fn with_model(raw: f64) -> CreditScorer {
        CreditScorer::new(ModelSlot::Loaded(Arc::new(Fixed(raw))), 300, 850)
    }

    #[test]
    fn test_established_customer() {
        let features: FeatureSet = [
            ("account_age_days", 400.0),
            ("monthly_income", 120_000.0),
            ("delinquency_count", 1.0),
            ("loan_history_count", 1.0),
            ("total_balance", 150_000.0),
        ]
        .into_iter()
        .collect();

        let result = fallback().predict(&features).unwrap();
        assert_eq!(result.credit_score, 810);
        assert_eq!(result.risk_category, CreditRiskCategory::Low);
        assert_eq!(result.score_range, ScoreRange::Excellent);
        assert_eq!(result.factors["account_age"], "Established account - positive impact");
        assert_eq!(result.factors["delinquency"], "1 delinquencies - negative impact");
        assert_eq!(result.factors["income"], "High income - positive impact");
    }

    #[test]
    fn test_empty_features() {
        let result = fallback().predict(&FeatureSet::new()).unwrap();
        assert_eq!(result.credit_score, 600);
        assert_eq!(result.risk_category, CreditRiskCategory::MediumHigh);
        assert_eq!(result.score_range, ScoreRange::Poor);
        assert_eq!(result.factors.len(), 2);
        assert_eq!(result.factors["account_age"], "New account - negative impact");
        assert_eq!(result.factors["income"], "Low income - negative impact");
    }

    #[test]
    fn test_sparse_factors() {
        // Mid-range age and income produce no notes
        let features = FeatureSet::new()
            .with("account_age_days", 200.0)
            .with("monthly_income", 60_000.0);
        let result = fallback().predict(&features).unwrap();
        assert!(result.factors.is_empty());
        assert_eq!(result.credit_score, 600 + 30 + 60);
        assert_eq!(result.risk_category, CreditRiskCategory::Medium);
    }

    #[test]
    fn test_band_edges_are_strict() {
        let score = |name: &str, value: f64| {
            rule_score(&FeatureSet::new().with(name, value)).unwrap()
        };
        assert_eq!(score("account_age_days", 365.0), 630.0);
        assert_eq!(score("account_age_days", 366.0), 650.0);
        assert_eq!(score("account_age_days", 90.0), 600.0);
        assert_eq!(score("monthly_income", 50_000.0), 630.0);
        assert_eq!(score("monthly_income", 100_000.0), 660.0);
        assert_eq!(score("total_balance", 100_000.0), 630.0);
    }

    #[test]
    fn test_rule_score_clamped_low() {
        let features = FeatureSet::new().with("delinquency_count", 30.0);
        let result = fallback().predict(&features).unwrap();
        assert_eq!(result.credit_score, 300);
        assert_eq!(result.risk_category, CreditRiskCategory::High);
        assert_eq!(result.score_range, ScoreRange::VeryPoor);
    }

    #[test]
    fn test_model_output_clamped() {
        assert_eq!(with_model(912.4).predict(&FeatureSet::new()).unwrap().credit_score, 850);
        assert_eq!(with_model(120.0).predict(&FeatureSet::new()).unwrap().credit_score, 300);
    }

    #[test]
    fn test_model_category_uses_unrounded_score() {
        let result = with_model(749.6).predict(&FeatureSet::new()).unwrap();
        assert_eq!(result.credit_score, 749);
        assert_eq!(result.risk_category, CreditRiskCategory::MediumLow);
        assert_eq!(result.score_range, ScoreRange::Good);
    }

    #[test]
    fn test_factors_independent_of_path() {
        let features = FeatureSet::new()
            .with("account_age_days", 30.0)
            .with("delinquency_count", 2.0);
        let from_rules = fallback().predict(&features).unwrap().factors;
        let from_model = with_model(700.0).predict(&features).unwrap().factors;
        assert_eq!(from_rules, from_model);
        assert_eq!(from_model["delinquency"], "2 delinquencies - negative impact");
    }

    #[test]
    fn test_delinquency_note_formatting() {
        let note = |count: f64| {
            factor_analysis(&FeatureSet::new().with("delinquency_count", count)).unwrap()
                ["delinquency"]
                .clone()
        };
        assert_eq!(note(3.0), "3 delinquencies - negative impact");
        assert_eq!(note(1.5), "1.5 delinquencies - negative impact");
    }

    #[test]
    fn test_non_finite_strings_rejected() {
        for raw in ["NaN", "inf", "-inf"] {
            let features = FeatureSet::new().with("delinquency_count", raw);
            let err = fallback().predict(&features).unwrap_err();
            assert!(
                matches!(err, Error::MalformedInput { ref feature, .. } if feature == "delinquency_count"),
                "{:?} was not rejected",
                raw
            );
        }
    }

    #[test]
    fn test_non_finite_model_output_is_model_error() {
        let err = with_model(f64::INFINITY)
            .predict(&FeatureSet::new())
            .unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_custom_bounds() {
        let scorer = CreditScorer::new(ModelSlot::Loaded(Arc::new(Fixed(990.0))), 350, 900);
        assert_eq!(scorer.predict(&FeatureSet::new()).unwrap().credit_score, 900);
    }
}
