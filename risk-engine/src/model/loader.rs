//! Model artifact loader

use super::artifact::ModelArtifact;
use super::{Classifier, Regressor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Why an artifact could not be used
#[derive(Debug, Error)]
pub enum LoadError {
    /// No file at the configured path
    #[error("Model file not found at {0}")]
    NotFound(PathBuf),

    /// File exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not a valid artifact document
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Artifact kind cannot serve the requested role
    #[error("Artifact kind '{kind}' cannot be used as a {role}")]
    WrongKind {
        /// Artifact kind
        kind: &'static str,
        /// Requested role
        role: &'static str,
    },

    /// Trained feature order differs from the scorer's
    #[error("Feature mismatch: expected {expected:?}, artifact declares {found:?}")]
    FeatureMismatch {
        /// Scorer feature order
        expected: Vec<String>,
        /// Artifact feature order
        found: Vec<String>,
    },

    /// Artifact failed structural validation
    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Outcome of loading one artifact
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Loader for JSON model artifacts
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelLoader;

impl ModelLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Read and validate an artifact against the expected feature order
    pub fn load_artifact(&self, path: &Path, expected: &[&str]) -> LoadResult<ModelArtifact> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if artifact.feature_names().iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(LoadError::FeatureMismatch {
                expected: expected.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names().to_vec(),
            });
        }

        artifact.validate().map_err(LoadError::Invalid)?;

        info!(
            path = %path.display(),
            kind = artifact.kind(),
            features = expected.len(),
            "Model artifact loaded"
        );

        Ok(artifact)
    }

    /// Load a classifier
    pub fn load_classifier(&self, path: &Path, expected: &[&str]) -> LoadResult<Arc<dyn Classifier>> {
        let artifact = self.load_artifact(path, expected)?;
        let kind = artifact.kind();
        artifact.into_classifier().ok_or(LoadError::WrongKind {
            kind,
            role: "classifier",
        })
    }

    /// Load a regressor
    pub fn load_regressor(&self, path: &Path, expected: &[&str]) -> LoadResult<Arc<dyn Regressor>> {
        let artifact = self.load_artifact(path, expected)?;
        let kind = artifact.kind();
        artifact.into_regressor().ok_or(LoadError::WrongKind {
            kind,
            role: "regressor",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(value: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[test]
    fn test_missing_file() {
        let err = ModelLoader::new()
            .load_classifier(Path::new("/nonexistent/fraud.json"), &["amount"])
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04pickle").unwrap();
        let err = ModelLoader::new()
            .load_classifier(file.path(), &["amount"])
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io { .. } | LoadError::Parse { .. }));
    }

    #[test]
    fn test_feature_mismatch() {
        let file = write_json(json!({
            "kind": "logistic",
            "feature_names": ["hour", "amount"],
            "coefficients": [0.1, 0.2],
            "intercept": 0.0
        }));
        let err = ModelLoader::new()
            .load_classifier(file.path(), &["amount", "hour"])
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::FeatureMismatch { .. }));
    }

    #[test]
    fn test_wrong_kind() {
        let file = write_json(json!({
            "kind": "logistic",
            "feature_names": ["amount"],
            "coefficients": [0.1],
            "intercept": 0.0
        }));
        let err = ModelLoader::new()
            .load_regressor(file.path(), &["amount"])
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::WrongKind { role: "regressor", .. }));
    }

    #[test]
    fn test_load_regressor() {
        let file = write_json(json!({
            "kind": "linear",
            "feature_names": ["monthly_income"],
            "coefficients": [0.001],
            "intercept": 600.0
        }));
        let model = ModelLoader::new()
            .load_regressor(file.path(), &["monthly_income"])
            .unwrap();
        let y = model.predict(&FeatureVector::from(vec![100_000.0])).unwrap();
        assert!((y - 700.0).abs() < 1e-9);
    }
}
