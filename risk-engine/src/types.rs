//! Core types for risk engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fraud risk tier and overall risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl RiskLevel {
    /// Fraud tier: `>= 0.7` high, `>= 0.4` medium, otherwise low
    pub fn from_fraud_score(score: f64) -> Self {
        if score >= 0.7 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Overall category: `< 0.3` low, `< 0.6` medium, otherwise high
    pub fn from_overall_risk(risk: f64) -> Self {
        if risk < 0.3 {
            RiskLevel::Low
        } else if risk < 0.6 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Credit risk category, five bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditRiskCategory {
    /// Score >= 750
    Low,
    /// Score >= 700
    MediumLow,
    /// Score >= 650
    Medium,
    /// Score >= 600
    MediumHigh,
    /// Below 600
    High,
}

impl CreditRiskCategory {
    /// Classify a clamped credit score
    pub fn from_score(score: f64) -> Self {
        if score >= 750.0 {
            CreditRiskCategory::Low
        } else if score >= 700.0 {
            CreditRiskCategory::MediumLow
        } else if score >= 650.0 {
            CreditRiskCategory::Medium
        } else if score >= 600.0 {
            CreditRiskCategory::MediumHigh
        } else {
            CreditRiskCategory::High
        }
    }
}

/// Qualitative credit score range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreRange {
    /// Score >= 750
    Excellent,
    /// Score >= 700
    Good,
    /// Score >= 650
    Fair,
    /// Score >= 600
    Poor,
    /// Below 600
    VeryPoor,
}

impl ScoreRange {
    /// Classify a clamped credit score
    pub fn from_score(score: f64) -> Self {
        if score >= 750.0 {
            ScoreRange::Excellent
        } else if score >= 700.0 {
            ScoreRange::Good
        } else if score >= 650.0 {
            ScoreRange::Fair
        } else if score >= 600.0 {
            ScoreRange::Poor
        } else {
            ScoreRange::VeryPoor
        }
    }
}

/// Action recommended for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Let the transaction through
    Approve,
    /// Hold for manual review
    Review,
    /// Reject outright
    Block,
}

impl Recommendation {
    /// `> 0.7` block, `> 0.4` review, otherwise approve
    pub fn from_overall_risk(risk: f64) -> Self {
        if risk > 0.7 {
            Recommendation::Block
        } else if risk > 0.4 {
            Recommendation::Review
        } else {
            Recommendation::Approve
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Approve => write!(f, "APPROVE"),
            Recommendation::Review => write!(f, "REVIEW"),
            Recommendation::Block => write!(f, "BLOCK"),
        }
    }
}

/// Fraud prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudScoreResult {
    /// Fraud probability in [0, 1]
    pub fraud_score: f64,

    /// Risk tier from fixed cut points
    pub risk_level: RiskLevel,

    /// Whether the score reaches the configured fraud threshold
    pub is_fraud: bool,
}

impl FraudScoreResult {
    /// Build a result from a score; the score is clamped to [0, 1] first
    pub fn from_score(score: f64, threshold: f64) -> Self {
        let fraud_score = score.clamp(0.0, 1.0);
        Self {
            fraud_score,
            risk_level: RiskLevel::from_fraud_score(fraud_score),
            is_fraud: fraud_score >= threshold,
        }
    }
}

/// Credit prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScoreResult {
    /// Credit score within the configured bounds
    pub credit_score: i64,

    /// Risk category
    pub risk_category: CreditRiskCategory,

    /// Score range
    pub score_range: ScoreRange,

    /// Human readable factor notes, only populated keys are present
    pub factors: BTreeMap<String, String>,
}

/// Weighted risk components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    /// `1 - credit_score / 850`
    pub credit_risk: f64,

    /// Fraud probability
    pub fraud_risk: f64,

    /// Amount band risk
    pub amount_risk: f64,
}

/// Combined risk decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecision {
    /// Weighted overall risk in [0, 1]
    pub overall_risk_score: f64,

    /// Overall category
    pub risk_category: RiskLevel,

    /// Components feeding the overall score
    pub components: RiskComponents,

    /// Credit score from the credit scorer
    pub credit_score: i64,

    /// Fraud score from the fraud scorer
    pub fraud_score: f64,

    /// Recommended action
    pub recommendation: Recommendation,
}
