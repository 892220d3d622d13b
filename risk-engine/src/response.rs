//! Response envelopes returned to callers

use crate::Error;
use serde::{Deserialize, Serialize};

/// Successful prediction envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always true
    pub success: bool,
    /// Prediction payload
    pub result: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a result
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

/// Failed prediction envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Always false
    pub success: bool,
    /// Stable error code
    pub error: String,
    /// Human readable message
    pub message: String,
}

impl ApiError {
    /// Build from an error code and message
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        ApiError::new(err.code(), format!("Prediction error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FraudScoreResult;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let envelope = ApiResponse::ok(FraudScoreResult::from_score(0.2, 0.5));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "result": { "fraud_score": 0.2, "risk_level": "LOW", "is_fraud": false }
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let err = Error::malformed("amount", "cannot parse 'x' as a number");
        let envelope = ApiError::from(&err);
        assert!(!envelope.success);
        assert_eq!(envelope.error, "MALFORMED_INPUT");
        assert!(envelope.message.starts_with("Prediction error: "));
        assert!(envelope.message.contains("amount"));
    }
}
