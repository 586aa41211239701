//! AWS Lambda handler for the scenario ROI engine
//!
//! Accepts a JSON request tagged by `operation` (`compare`, `compare_all`,
//! `sweep`, `score`) and returns the matching result. Engine failures are
//! reported in the `error` field rather than as Lambda errors so callers
//! always get a JSON body back.
//!
//! Engine settings come from `ROI_*` environment variables.

use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use scenario_roi::{
    CompetitiveIndexRecord, CompetitiveMetrics, EngineConfig, ProjectionSet, RoiError,
    ScenarioComparator, ScenarioRoiResult, SensitivityGrid, SensitivityRow, SweepSpec,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input for one engine call
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RoiRequest {
    Compare {
        projections: ProjectionSet,
        #[serde(default)]
        horizon_years: Option<u32>,
    },
    CompareAll {
        projections: ProjectionSet,
        #[serde(default)]
        horizon_years: Option<u32>,
    },
    Sweep {
        projections: ProjectionSet,
        #[serde(default)]
        horizon_years: Option<u32>,
        #[serde(default)]
        sweep: SweepSpec,
    },
    Score {
        metrics: CompetitiveMetrics,
    },
}

/// Output from the engine call
#[derive(Debug, Default, Serialize)]
pub struct RoiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ScenarioRoiResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<Vec<ScenarioRoiResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Vec<SensitivityRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_index: Option<CompetitiveIndexRecord>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn config_for(base: &EngineConfig, horizon_years: Option<u32>) -> EngineConfig {
    match horizon_years {
        Some(years) => base.with_horizon(years),
        None => base.clone(),
    }
}

fn process(request: RoiRequest, config: &EngineConfig) -> Result<RoiResponse, RoiError> {
    let response = match request {
        RoiRequest::Compare { projections, horizon_years } => RoiResponse {
            comparison: Some(
                ScenarioComparator::with_config(config_for(config, horizon_years)).compare(&projections)?,
            ),
            ..RoiResponse::default()
        },
        RoiRequest::CompareAll { projections, horizon_years } => RoiResponse {
            comparisons: Some(
                ScenarioComparator::with_config(config_for(config, horizon_years)).compare_all(&projections)?,
            ),
            ..RoiResponse::default()
        },
        RoiRequest::Sweep { projections, horizon_years, sweep } => RoiResponse {
            sensitivity: Some(
                SensitivityGrid::with_config(config_for(config, horizon_years)).run(&projections, &sweep)?,
            ),
            ..RoiResponse::default()
        },
        RoiRequest::Score { metrics } => RoiResponse {
            competitive_index: Some(CompetitiveIndexRecord::new(metrics, Utc::now())),
            ..RoiResponse::default()
        },
    };
    Ok(response)
}

async fn handler(event: LambdaEvent<RoiRequest>) -> Result<RoiResponse, Error> {
    let start = Instant::now();
    let config = EngineConfig::from_env();

    let mut response = match process(event.payload, &config) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("request failed: {}", e);
            RoiResponse {
                error: Some(e.to_string()),
                ..RoiResponse::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
