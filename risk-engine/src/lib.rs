//! Risk decision engine
//!
//! Turns a transaction/customer feature snapshot into a fraud score, a
//! credit score and a combined risk recommendation. Each scorer uses a
//! trained model when one is loaded and a deterministic rule score
//! otherwise.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
pub mod credit;
pub mod engine;
pub mod error;
pub mod features;
pub mod fraud;
pub mod metrics;
pub mod model;
pub mod request;
pub mod response;
pub mod types;

pub use aggregator::RiskAggregator;
pub use config::{EngineConfig, ModelsConfig, ScoringConfig};
pub use credit::CreditScorer;
pub use engine::RiskEngine;
pub use error::{Error, Result};
pub use features::{FeatureSet, FeatureVector};
pub use fraud::FraudScorer;
pub use model::{ModelRegistry, ModelSlot};
pub use request::{CreditRequest, FraudRequest, RiskRequest};
pub use response::{ApiError, ApiResponse};
pub use types::*;
