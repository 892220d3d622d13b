//! Engine facade wiring the scorers to one registry

use crate::aggregator::RiskAggregator;
use crate::config::ScoringConfig;
use crate::credit::CreditScorer;
use crate::fraud::FraudScorer;
use crate::model::{ModelRegistry, ReadinessReport};
use tracing::info;

/// The three scorers, built once and shared by every request
#[derive(Debug, Clone)]
pub struct RiskEngine {
    fraud: FraudScorer,
    credit: CreditScorer,
    risk: RiskAggregator,
    readiness: ReadinessReport,
}

impl RiskEngine {
    /// Build the scorers from a loaded registry
    pub fn new(registry: &ModelRegistry, scoring: &ScoringConfig) -> Self {
        let fraud = FraudScorer::from_registry(registry, scoring);
        let credit = CreditScorer::from_registry(registry, scoring);
        let risk = RiskAggregator::new(credit.clone(), fraud.clone());

        info!(
            fraud_model = fraud.is_model_loaded(),
            credit_model = credit.is_model_loaded(),
            fraud_threshold = scoring.fraud_threshold,
            "Risk engine initialized"
        );

        Self {
            fraud,
            credit,
            risk,
            readiness: registry.readiness(),
        }
    }

    /// Engine running rules only
    pub fn fallback_only() -> Self {
        Self::new(&ModelRegistry::fallback_only(), &ScoringConfig::default())
    }

    /// Fraud scorer
    pub fn fraud(&self) -> &FraudScorer {
        &self.fraud
    }

    /// Credit scorer
    pub fn credit(&self) -> &CreditScorer {
        &self.credit
    }

    /// Risk aggregator
    pub fn risk(&self) -> &RiskAggregator {
        &self.risk
    }

    /// Model readiness captured at construction
    pub fn readiness(&self) -> &ReadinessReport {
        &self.readiness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;

    #[test]
    fn test_fallback_engine() {
        let engine = RiskEngine::fallback_only();
        assert!(!engine.fraud().is_model_loaded());
        assert!(!engine.credit().is_model_loaded());
        assert_eq!(engine.fraud().threshold(), 0.5);
        assert!(!engine.readiness().fraud_model_loaded);

        let decision = engine.risk().predict(&FeatureSet::new()).unwrap();
        let credit = engine.credit().predict(&FeatureSet::new()).unwrap();
        // The aggregator applies request defaults, the bare scorer does not
        assert_eq!(decision.credit_score, 690);
        assert_eq!(credit.credit_score, 600);
    }

    #[test]
    fn test_threshold_from_config() {
        let scoring = ScoringConfig {
            fraud_threshold: 0.3,
            ..ScoringConfig::default()
        };
        let engine = RiskEngine::new(&ModelRegistry::fallback_only(), &scoring);

        // 0.3 from a new beneficiary alone
        let features = FeatureSet::new().with("beneficiary_age_days", 2.0);
        assert!(engine.fraud().predict(&features).unwrap().is_fraud);
    }
}
