//! Typed prediction requests
//!
//! Each scorer has a fixed field list with request-level defaults. Unknown
//! fields are rejected so that a misspelled key fails loudly instead of
//! silently falling back to a default.

use crate::features::FeatureSet;
use serde::{Deserialize, Serialize};

macro_rules! default_fn {
    ($($name:ident = $value:expr;)*) => {
        $(fn $name() -> f64 { $value })*
    };
}

default_fn! {
    default_hour = 12.0;
    default_day_of_week = 3.0;
    default_avg_amount = 10_000.0;
    default_beneficiary_age = 365.0;
    default_account_age = 365.0;
    default_balance = 100_000.0;
    default_income = 50_000.0;
    default_count_30d = 10.0;
    default_count_7d = 5.0;
    default_utilization = 0.3;
    default_savings_ratio = 0.2;
}

/// Fraud prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FraudRequest {
    /// Transaction amount
    pub amount: f64,
    /// Hour of day
    #[serde(default = "default_hour")]
    pub hour: f64,
    /// Day of week
    #[serde(default = "default_day_of_week")]
    pub day_of_week: f64,
    /// Transactions in the last 24 hours
    #[serde(default)]
    pub transaction_count_24h: f64,
    /// Transactions in the last 7 days
    #[serde(default)]
    pub transaction_count_7d: f64,
    /// Average amount over the last 7 days
    #[serde(default = "default_avg_amount")]
    pub avg_amount_7d: f64,
    /// Days since the beneficiary was added
    #[serde(default = "default_beneficiary_age")]
    pub beneficiary_age_days: f64,
    /// Device risk signal
    #[serde(default)]
    pub device_risk: f64,
    /// Location risk signal
    #[serde(default)]
    pub location_risk: f64,
    /// Age of the paying account in days
    #[serde(default = "default_account_age")]
    pub user_account_age_days: f64,
    /// Balance of the paying account
    #[serde(default = "default_balance")]
    pub user_balance: f64,
}

impl From<FraudRequest> for FeatureSet {
    fn from(req: FraudRequest) -> Self {
        [
            ("amount", req.amount),
            ("hour", req.hour),
            ("day_of_week", req.day_of_week),
            ("transaction_count_24h", req.transaction_count_24h),
            ("transaction_count_7d", req.transaction_count_7d),
            ("avg_amount_7d", req.avg_amount_7d),
            ("beneficiary_age_days", req.beneficiary_age_days),
            ("device_risk", req.device_risk),
            ("location_risk", req.location_risk),
            ("user_account_age_days", req.user_account_age_days),
            ("user_balance", req.user_balance),
        ]
        .into_iter()
        .collect()
    }
}

/// Credit scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreditRequest {
    /// Account age in days
    pub account_age_days: f64,
    /// Monthly income
    #[serde(default = "default_income")]
    pub monthly_income: f64,
    /// Total balance
    #[serde(default = "default_balance")]
    pub total_balance: f64,
    /// Transactions in the last 30 days
    #[serde(default = "default_count_30d")]
    pub transaction_count_30d: f64,
    /// Number of delinquencies
    #[serde(default)]
    pub delinquency_count: f64,
    /// Number of past loans
    #[serde(default)]
    pub loan_history_count: f64,
    /// Average transaction amount
    #[serde(default = "default_avg_amount")]
    pub avg_transaction_amount: f64,
    /// Credit utilization ratio
    #[serde(default = "default_utilization")]
    pub credit_utilization: f64,
    /// Savings ratio
    #[serde(default = "default_savings_ratio")]
    pub savings_ratio: f64,
}

impl From<CreditRequest> for FeatureSet {
    fn from(req: CreditRequest) -> Self {
        [
            ("account_age_days", req.account_age_days),
            ("monthly_income", req.monthly_income),
            ("total_balance", req.total_balance),
            ("transaction_count_30d", req.transaction_count_30d),
            ("delinquency_count", req.delinquency_count),
            ("loan_history_count", req.loan_history_count),
            ("avg_transaction_amount", req.avg_transaction_amount),
            ("credit_utilization", req.credit_utilization),
            ("savings_ratio", req.savings_ratio),
        ]
        .into_iter()
        .collect()
    }
}

/// Combined risk request, credit and fraud fields together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskRequest {
    // Credit features
    /// Account age in days
    pub account_age_days: f64,
    /// Monthly income
    #[serde(default = "default_income")]
    pub monthly_income: f64,
    /// Total balance
    #[serde(default = "default_balance")]
    pub total_balance: f64,
    /// Transactions in the last 30 days
    #[serde(default = "default_count_30d")]
    pub transaction_count_30d: f64,
    /// Number of delinquencies
    #[serde(default)]
    pub delinquency_count: f64,
    /// Number of past loans
    #[serde(default)]
    pub loan_history_count: f64,

    // Fraud features
    /// Transaction amount
    #[serde(default)]
    pub amount: f64,
    /// Hour of day
    #[serde(default = "default_hour")]
    pub hour: f64,
    /// Day of week
    #[serde(default = "default_day_of_week")]
    pub day_of_week: f64,
    /// Transactions in the last 24 hours
    #[serde(default)]
    pub transaction_count_24h: f64,
    /// Transactions in the last 7 days
    #[serde(default = "default_count_7d")]
    pub transaction_count_7d: f64,
    /// Average amount over the last 7 days
    #[serde(default = "default_avg_amount")]
    pub avg_amount_7d: f64,
    /// Days since the beneficiary was added
    #[serde(default = "default_beneficiary_age")]
    pub beneficiary_age_days: f64,
    /// Device risk signal
    #[serde(default)]
    pub device_risk: f64,
    /// Location risk signal
    #[serde(default)]
    pub location_risk: f64,
}

impl From<RiskRequest> for FeatureSet {
    fn from(req: RiskRequest) -> Self {
        [
            ("account_age_days", req.account_age_days),
            ("monthly_income", req.monthly_income),
            ("total_balance", req.total_balance),
            ("transaction_count_30d", req.transaction_count_30d),
            ("delinquency_count", req.delinquency_count),
            ("loan_history_count", req.loan_history_count),
            ("amount", req.amount),
            ("hour", req.hour),
            ("day_of_week", req.day_of_week),
            ("transaction_count_24h", req.transaction_count_24h),
            ("transaction_count_7d", req.transaction_count_7d),
            ("avg_amount_7d", req.avg_amount_7d),
            ("beneficiary_age_days", req.beneficiary_age_days),
            ("device_risk", req.device_risk),
            ("location_risk", req.location_risk),
        ]
        .into_iter()
        .collect()
    }
}
