//! Prometheus metrics for the scorers

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    /// Predictions served, by scorer and scoring path
    pub static ref PREDICTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("risk_predictions_total", "Total predictions by scorer and mode"),
        &["scorer", "mode"]
    ).expect("metric can be created");

    /// Predictions that returned an error
    pub static ref PREDICTION_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("risk_prediction_errors_total", "Total failed predictions by scorer"),
        &["scorer"]
    ).expect("metric can be created");

    /// Time spent inside a scorer
    pub static ref PREDICTION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("risk_prediction_duration_seconds", "Prediction duration in seconds")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]),
        &["scorer"]
    ).expect("metric can be created");

    /// Model load status per artifact
    pub static ref MODEL_LOADED: IntGaugeVec = IntGaugeVec::new(
        Opts::new("risk_model_loaded", "1 when a trained model is serving, 0 on fallback"),
        &["model"]
    ).expect("metric can be created");
}

/// Scoring path label
pub(crate) fn mode_label(model_loaded: bool) -> &'static str {
    if model_loaded {
        "model"
    } else {
        "rules"
    }
}

/// Register all metrics with the given registry
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    registry.register(Box::new(PREDICTION_ERRORS_TOTAL.clone()))?;
    registry.register(Box::new(PREDICTION_DURATION.clone()))?;
    registry.register(Box::new(MODEL_LOADED.clone()))?;
    Ok(())
}

/// Render the registry in Prometheus text format
pub fn gather_metrics(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
