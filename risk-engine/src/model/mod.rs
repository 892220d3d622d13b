//! Trained model artifacts
//!
//! Scorers only see the [`Classifier`] and [`Regressor`] traits. Concrete
//! artifacts live in [`artifact`], file loading in [`loader`] and the
//! process-wide holder in [`registry`].

pub mod artifact;
pub mod loader;
pub mod registry;

pub use artifact::{LinearModel, LogisticModel, ModelArtifact, TreeEnsemble};
pub use loader::{LoadError, LoadResult, ModelLoader};
pub use registry::{ModelRegistry, ModelStatus, ReadinessReport};

use crate::features::FeatureVector;
use crate::Result;
use std::sync::Arc;

/// Binary classifier returning the probability of the positive class
pub trait Classifier: Send + Sync {
    /// Probability of the positive (fraud) class
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;
}

/// Regressor returning a raw score
pub trait Regressor: Send + Sync {
    /// Raw predicted value
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

/// A model that may or may not have loaded
pub enum ModelSlot<M: ?Sized> {
    /// Artifact loaded and validated
    Loaded(Arc<M>),
    /// No usable artifact, scorer runs its rules
    Unavailable(String),
}

impl<M: ?Sized> ModelSlot<M> {
    /// Whether a real model is present
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }
}

impl<M: ?Sized> Clone for ModelSlot<M> {
    fn clone(&self) -> Self {
        match self {
            ModelSlot::Loaded(model) => ModelSlot::Loaded(Arc::clone(model)),
            ModelSlot::Unavailable(reason) => ModelSlot::Unavailable(reason.clone()),
        }
    }
}

impl<M: ?Sized> std::fmt::Debug for ModelSlot<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSlot::Loaded(_) => f.write_str("Loaded"),
            ModelSlot::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(crate::Error::Model(format!("{} produced a non-finite value", what)))
    }
}
