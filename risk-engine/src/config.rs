//! Engine configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `RISK_ENGINE__*` style environment variables, then the flat variables
//! used by the deployment manifests (`FRAUD_MODEL_PATH`, `FRAUD_THRESHOLD`, ...).

use crate::{Error, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional config file
pub const CONFIG_FILE_ENV: &str = "RISK_ENGINE_CONFIG";

/// Flat environment overrides and the keys they set
const FLAT_OVERRIDES: [(&str, &str); 5] = [
    ("FRAUD_MODEL_PATH", "models.fraud_model_path"),
    ("CREDIT_MODEL_PATH", "models.credit_model_path"),
    ("FRAUD_THRESHOLD", "scoring.fraud_threshold"),
    ("CREDIT_SCORE_MIN", "scoring.credit_score_min"),
    ("CREDIT_SCORE_MAX", "scoring.credit_score_max"),
];

/// Complete engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Model artifact locations
    pub models: ModelsConfig,
    /// Scoring thresholds
    pub scoring: ScoringConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Model artifact locations, one per scorer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Fraud classifier artifact
    pub fraud_model_path: PathBuf,
    /// Credit regressor artifact
    pub credit_model_path: PathBuf,
}

/// Numeric thresholds shared by the scorers
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// `is_fraud` is set at or above this probability
    pub fraud_threshold: f64,
    /// Lowest credit score
    pub credit_score_min: i64,
    /// Highest credit score
    pub credit_score_max: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fraud_threshold: 0.5,
            credit_score_min: 300,
            credit_score_max: 850,
        }
    }
}

impl ScoringConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fraud_threshold) {
            return Err(Error::InvalidConfig(format!(
                "fraud_threshold must be within [0, 1], got {}",
                self.fraud_threshold
            )));
        }
        if self.credit_score_min >= self.credit_score_max {
            return Err(Error::InvalidConfig(format!(
                "credit_score_min ({}) must be below credit_score_max ({})",
                self.credit_score_min, self.credit_score_max
            )));
        }
        Ok(())
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `risk_engine=debug`
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl EngineConfig {
    /// Load defaults, the file named by `RISK_ENGINE_CONFIG` if set, and the environment
    pub fn from_env() -> Result<Self> {
        let file = env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        let mut builder = Self::builder(file.as_deref())?
            .add_source(Environment::with_prefix("RISK_ENGINE").separator("__"));

        for (var, key) in FLAT_OVERRIDES {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        Self::finish(builder)
    }

    /// Load defaults and a config file, ignoring the environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::finish(Self::builder(Some(path.as_ref()))?)
    }

    fn builder(file: Option<&Path>) -> Result<ConfigBuilder<DefaultState>> {
        let defaults = ScoringConfig::default();
        let mut builder = config::Config::builder()
            // Model artifacts
            .set_default("models.fraud_model_path", "models/fraud_detection_model.json")?
            .set_default("models.credit_model_path", "models/credit_scoring_model.json")?
            // Scoring
            .set_default("scoring.fraud_threshold", defaults.fraud_threshold)?
            .set_default("scoring.credit_score_min", defaults.credit_score_min)?
            .set_default("scoring.credit_score_max", defaults.credit_score_max)?
            // Logging
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.scoring.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
            [models]
            fraud_model_path = "/srv/models/fraud.json"

            [scoring]
            fraud_threshold = 0.65
            "#,
        );

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.models.fraud_model_path, PathBuf::from("/srv/models/fraud.json"));
        assert_eq!(
            config.models.credit_model_path,
            PathBuf::from("models/credit_scoring_model.json")
        );
        assert_eq!(config.scoring.fraud_threshold, 0.65);
        assert_eq!(config.scoring.credit_score_min, 300);
        assert_eq!(config.scoring.credit_score_max, 850);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let file = toml_file("[scoring]\nfraud_threshold = 1.5\n");
        let err = EngineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let file = toml_file("[scoring]\ncredit_score_min = 900\n");
        assert!(EngineConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = EngineConfig::from_file("/nonexistent/risk-engine.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_scoring_defaults() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.fraud_threshold, 0.5);
        assert!(scoring.validate().is_ok());
    }
}
