//! Risk Engine Binary
//!
//! Scores JSON requests from a file or stdin and writes response envelopes
//! to stdout. Logs go to stderr.
//!
//! ```text
//! risk-engine <fraud|credit|risk|ready> [input.json|-] [--metrics]
//! ```
//!
//! The input is a single request object or an array of them.

use anyhow::Context;
use dotenv::dotenv;
use prometheus::Registry;
use risk_engine::config::LoggingConfig;
use risk_engine::metrics::{gather_metrics, register_metrics};
use risk_engine::{
    ApiError, ApiResponse, CreditRequest, EngineConfig, Error, FeatureSet, FraudRequest,
    ModelRegistry, RiskEngine, RiskRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "usage: risk-engine <fraud|credit|risk|ready> [input.json|-] [--metrics]";

fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let print_metrics = args.iter().any(|a| a == "--metrics");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();

    let Some(&command) = positional.first() else {
        eprintln!("{}", USAGE);
        return Ok(ExitCode::from(2));
    };

    let metrics_registry = Registry::new();
    register_metrics(&metrics_registry)?;

    let registry = ModelRegistry::load(&config.models);
    let engine = RiskEngine::new(&registry, &config.scoring);

    let (output, ok) = match command {
        "ready" => (serde_json::to_value(engine.readiness())?, true),
        "fraud" => run::<FraudRequest, _, _>(read_input(positional.get(1).copied())?, |batch| {
            batch.iter().map(|features| engine.fraud().predict(features)).collect()
        })?,
        "credit" => run::<CreditRequest, _, _>(read_input(positional.get(1).copied())?, |batch| {
            batch.iter().map(|features| engine.credit().predict(features)).collect()
        })?,
        "risk" => run::<RiskRequest, _, _>(read_input(positional.get(1).copied())?, |batch| {
            engine.risk().predict_batch(batch)
        })?,
        other => {
            eprintln!("unknown command '{}'\n{}", other, USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if print_metrics {
        eprintln!("{}", gather_metrics(&metrics_registry)?);
    }

    info!(command = %command, success = ok, "Request processed");
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn read_input(path: Option<&str>) -> anyhow::Result<Value> {
    let content = match path {
        None | Some("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input from {}", path))?,
    };
    serde_json::from_str(&content).context("Input is not valid JSON")
}

/// Score one request or an array of them
///
/// Requests that fail to deserialize get an error envelope in place; the
/// rest are scored together.
fn run<R, T, F>(input: Value, score: F) -> anyhow::Result<(Value, bool)>
where
    R: DeserializeOwned + Into<FeatureSet>,
    T: Serialize,
    F: FnOnce(&[FeatureSet]) -> Vec<risk_engine::Result<T>>,
{
    let (items, single) = match input {
        Value::Array(items) => (items, false),
        other => (vec![other], true),
    };

    let requests: Vec<risk_engine::Result<FeatureSet>> = items
        .into_iter()
        .map(|item| -> risk_engine::Result<FeatureSet> {
            Ok(serde_json::from_value::<R>(item)?.into())
        })
        .collect();
    let valid: Vec<FeatureSet> = requests
        .iter()
        .filter_map(|request| request.as_ref().ok().cloned())
        .collect();
    let mut scored = score(&valid).into_iter();

    let mut all_ok = true;
    let mut envelopes = Vec::with_capacity(requests.len());
    for request in requests {
        let result = request.and_then(|_| {
            scored
                .next()
                .unwrap_or_else(|| Err(Error::Model("batch returned too few results".to_string())))
        });
        let (envelope, ok) = envelope(result)?;
        all_ok &= ok;
        envelopes.push(envelope);
    }

    let output = if single {
        envelopes.pop().unwrap_or(Value::Null)
    } else {
        Value::Array(envelopes)
    };
    Ok((output, all_ok))
}

fn envelope<T: Serialize>(result: risk_engine::Result<T>) -> anyhow::Result<(Value, bool)> {
    match result {
        Ok(result) => Ok((serde_json::to_value(ApiResponse::ok(result))?, true)),
        Err(e) => {
            error!(error = %e, "Prediction failed");
            Ok((serde_json::to_value(ApiError::from(&e))?, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_keeps_positions_around_invalid_requests() {
        let engine = RiskEngine::fallback_only();
        let input = json!([
            { "account_age_days": 400, "amount": 250000 },
            { "account_age_days": 400, "amout": 10 },
            { "account_age_days": 30 }
        ]);

        let mut batch_len = 0;
        let (output, ok) = run::<RiskRequest, _, _>(input, |batch| {
            batch_len = batch.len();
            engine.risk().predict_batch(batch)
        })
        .unwrap();

        assert!(!ok);
        assert_eq!(batch_len, 2);
        let envelopes = output.as_array().unwrap();
        assert_eq!(envelopes.len(), 3);
        assert_eq!(envelopes[0]["success"], true);
        assert_eq!(envelopes[1]["success"], false);
        assert_eq!(envelopes[1]["error"], "INVALID_REQUEST");
        assert_eq!(envelopes[2]["success"], true);
        assert_eq!(envelopes[2]["result"]["recommendation"], "APPROVE");
    }

    #[test]
    fn test_single_object_yields_single_envelope() {
        let engine = RiskEngine::fallback_only();
        let (output, ok) = run::<FraudRequest, _, _>(json!({ "amount": 1000 }), |batch| {
            batch.iter().map(|features| engine.fraud().predict(features)).collect()
        })
        .unwrap();

        assert!(ok);
        assert_eq!(output["success"], true);
        assert_eq!(output["result"]["risk_level"], "LOW");
    }
}
