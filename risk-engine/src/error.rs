//! Error types for risk engine

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// A feature value could not be coerced to a number
    #[error("Malformed input for feature '{feature}': {reason}")]
    MalformedInput {
        /// Feature name
        feature: String,
        /// Why coercion failed
        reason: String,
    },

    /// A loaded model failed while scoring
    #[error("ML model error: {0}")]
    Model(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration source error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a malformed input error
    pub fn malformed(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code used in response envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedInput { .. } => "MALFORMED_INPUT",
            Error::Model(_) => "MODEL_ERROR",
            Error::InvalidConfig(_) | Error::Config(_) => "CONFIGURATION_ERROR",
            Error::Json(_) => "INVALID_REQUEST",
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
