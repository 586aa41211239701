//! Engine configuration
//!
//! Defaults match the values the comparator and sweep use when a caller
//! does not say otherwise. Hosts can override any of them through `ROI_*`
//! environment variables; unparsable values fall back to the default.

use crate::projection::{CashflowAssumptions, IrrConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default forecast horizon in years
pub const DEFAULT_HORIZON_YEARS: u32 = 5;

/// Default capital-expenditure drag as a fraction of free cash flow
pub const DEFAULT_CAPEX_PCT: f64 = 0.03;

/// Default working-capital drag as a fraction of free cash flow
pub const DEFAULT_NWC_PCT: f64 = 0.01;

/// Discount rate used when the projection set carries none (or a non-finite one)
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;

/// Upper bound on sensitivity grid cardinality
pub const DEFAULT_MAX_GRID_POINTS: usize = 250_000;

/// Longest forecast horizon a comparison or sweep may build
pub const DEFAULT_MAX_HORIZON_YEARS: u32 = 100;

/// Grids at least this large are evaluated on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Configuration shared by the comparator and the sensitivity grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Forecast horizon in years
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Capex drag (fraction of free cash flow)
    #[serde(default = "default_capex_pct")]
    pub capex_pct: f64,

    /// Net working capital drag (fraction of free cash flow)
    #[serde(default = "default_nwc_pct")]
    pub nwc_pct: f64,

    /// Fallback discount rate
    #[serde(default = "default_discount_rate")]
    pub default_discount_rate: f64,

    /// IRR solver settings
    #[serde(default)]
    pub irr: IrrConfig,

    /// Maximum number of grid points a single sweep may evaluate
    #[serde(default = "default_max_grid_points")]
    pub max_grid_points: usize,

    /// Maximum forecast horizon accepted from callers
    #[serde(default = "default_max_horizon_years")]
    pub max_horizon_years: u32,

    /// Minimum grid size before evaluation goes parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_horizon_years() -> u32 { DEFAULT_HORIZON_YEARS }
fn default_capex_pct() -> f64 { DEFAULT_CAPEX_PCT }
fn default_nwc_pct() -> f64 { DEFAULT_NWC_PCT }
fn default_discount_rate() -> f64 { DEFAULT_DISCOUNT_RATE }
fn default_max_grid_points() -> usize { DEFAULT_MAX_GRID_POINTS }
fn default_max_horizon_years() -> u32 { DEFAULT_MAX_HORIZON_YEARS }
fn default_parallel_threshold() -> usize { DEFAULT_PARALLEL_THRESHOLD }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            capex_pct: DEFAULT_CAPEX_PCT,
            nwc_pct: DEFAULT_NWC_PCT,
            default_discount_rate: DEFAULT_DISCOUNT_RATE,
            irr: IrrConfig::default(),
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
            max_horizon_years: DEFAULT_MAX_HORIZON_YEARS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Build a config from defaults overridden by `ROI_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let irr_defaults = IrrConfig::default();

        Self {
            horizon_years: env_or("ROI_HORIZON_YEARS", defaults.horizon_years),
            capex_pct: env_or("ROI_CAPEX_PCT", defaults.capex_pct),
            nwc_pct: env_or("ROI_NWC_PCT", defaults.nwc_pct),
            default_discount_rate: env_or("ROI_DEFAULT_DISCOUNT_RATE", defaults.default_discount_rate),
            irr: IrrConfig {
                initial_guess: env_or("ROI_IRR_GUESS", irr_defaults.initial_guess),
                max_iterations: env_or("ROI_IRR_MAX_ITERATIONS", irr_defaults.max_iterations),
                ..irr_defaults
            },
            max_grid_points: env_or("ROI_MAX_GRID_POINTS", defaults.max_grid_points),
            max_horizon_years: env_or("ROI_MAX_HORIZON_YEARS", defaults.max_horizon_years),
            parallel_threshold: env_or("ROI_PARALLEL_THRESHOLD", defaults.parallel_threshold),
        }
    }

    /// Copy of this config with a different horizon
    pub fn with_horizon(&self, horizon_years: u32) -> Self {
        Self {
            horizon_years,
            ..self.clone()
        }
    }

    /// Cash-flow building parameters implied by this config
    pub fn cashflow_assumptions(&self) -> CashflowAssumptions {
        CashflowAssumptions {
            years: self.horizon_years,
            capex_pct: self.capex_pct,
            nwc_pct: self.nwc_pct,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
