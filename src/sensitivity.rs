//! Sensitivity sweeps over the comparison inputs
//!
//! A sweep evaluates the baseline/scenario comparison at every point of the
//! Cartesian product of five parameter lists. Rows come back in nesting
//! order, outermost first: discount rate, growth rate, terminal multiple,
//! capex %, nwc %. Consumers rely on that positional order.

use crate::assumptions::ProjectionSet;
use crate::config::EngineConfig;
use crate::error::RoiError;
use crate::projection::{CashflowAssumptions, IrrStatus};
use crate::scenario::{check_horizon, discount_rate_for, resolve_pair, value_pair};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Values to sweep for each parameter
///
/// A `None` (or empty) list means "hold this parameter at its base value":
/// the set's discount rate, the scenario's growth rate and terminal
/// multiple, and the configured capex / nwc percentages. Non-finite entries
/// are replaced the same way the cash-flow build would resolve them; a
/// non-finite discount rate becomes the configured default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rates: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rates: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_multiples: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capex_pcts: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nwc_pcts: Option<Vec<f64>>,
}

impl SweepSpec {
    pub fn discount_rates(mut self, values: Vec<f64>) -> Self {
        self.discount_rates = Some(values);
        self
    }

    pub fn growth_rates(mut self, values: Vec<f64>) -> Self {
        self.growth_rates = Some(values);
        self
    }

    pub fn terminal_multiples(mut self, values: Vec<f64>) -> Self {
        self.terminal_multiples = Some(values);
        self
    }

    pub fn capex_pcts(mut self, values: Vec<f64>) -> Self {
        self.capex_pcts = Some(values);
        self
    }

    pub fn nwc_pcts(mut self, values: Vec<f64>) -> Self {
        self.nwc_pcts = Some(values);
        self
    }
}

/// One evaluated grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub discount_rate: f64,
    pub growth_rate: f64,
    pub terminal_multiple: f64,
    pub capex_pct: f64,
    pub nwc_pct: f64,
    pub baseline_npv: f64,
    pub scenario_npv: f64,
    pub delta_npv: f64,
    pub scenario_irr: f64,
    pub irr_status: IrrStatus,
}

/// Sweep axes with defaults filled in
#[derive(Debug, Clone)]
struct GridAxes {
    discount_rates: Vec<f64>,
    growth_rates: Vec<f64>,
    terminal_multiples: Vec<f64>,
    capex_pcts: Vec<f64>,
    nwc_pcts: Vec<f64>,
}

/// Parameter values at one grid point
#[derive(Debug, Clone, Copy)]
struct GridPoint {
    discount_rate: f64,
    growth_rate: f64,
    terminal_multiple: f64,
    capex_pct: f64,
    nwc_pct: f64,
}

impl GridAxes {
    fn axes(&self) -> [&[f64]; 5] {
        [
            self.discount_rates.as_slice(),
            self.growth_rates.as_slice(),
            self.terminal_multiples.as_slice(),
            self.capex_pcts.as_slice(),
            self.nwc_pcts.as_slice(),
        ]
    }

    /// Number of grid points, or `None` if it overflows `usize`
    fn cardinality(&self) -> Option<usize> {
        self.axes()
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
    }

    /// Decode a flat index into parameter values (last axis varies fastest)
    fn point(&self, index: usize) -> GridPoint {
        let mut rest = index;
        let mut take = |axis: &[f64]| {
            let value = axis[rest % axis.len()];
            rest /= axis.len();
            value
        };

        let nwc_pct = take(self.nwc_pcts.as_slice());
        let capex_pct = take(self.capex_pcts.as_slice());
        let terminal_multiple = take(self.terminal_multiples.as_slice());
        let growth_rate = take(self.growth_rates.as_slice());
        let discount_rate = take(self.discount_rates.as_slice());

        GridPoint {
            discount_rate,
            growth_rate,
            terminal_multiple,
            capex_pct,
            nwc_pct,
        }
    }
}

/// Axis values with non-finite entries replaced by `fallback`
///
/// An omitted or empty list holds the parameter at `base()`, which is only
/// evaluated in that case.
fn resolve_axis(values: &Option<Vec<f64>>, fallback: f64, base: impl FnOnce() -> f64) -> Vec<f64> {
    match values {
        Some(v) if !v.is_empty() => v
            .iter()
            .map(|&x| if x.is_finite() { x } else { fallback })
            .collect(),
        _ => vec![base()],
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Runs sensitivity sweeps under a fixed engine configuration
#[derive(Debug, Clone, Default)]
pub struct SensitivityGrid {
    config: EngineConfig,
}

impl SensitivityGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sweep over the configured horizon
    pub fn run(&self, set: &ProjectionSet, spec: &SweepSpec) -> Result<Vec<SensitivityRow>, RoiError> {
        self.run_over(set, self.config.horizon_years, spec)
    }

    /// Sweep over `horizon_years`
    ///
    /// Growth rate and terminal multiple are substituted into the scenario
    /// projection only. Capex and nwc percentages apply to both builds.
    /// Fails before doing any work if the grid exceeds
    /// `EngineConfig::max_grid_points`.
    pub fn run_over(
        &self,
        set: &ProjectionSet,
        horizon_years: u32,
        spec: &SweepSpec,
    ) -> Result<Vec<SensitivityRow>, RoiError> {
        let (baseline, kind, scenario) = resolve_pair(set)?;
        check_horizon(horizon_years, &self.config)?;

        // Rows report the values the cash-flow build actually uses
        let config = &self.config;
        let growth = scenario.resolved_growth_rate();
        let multiple = scenario.resolved_terminal_multiple();
        let capex = finite_or_zero(config.capex_pct);
        let nwc = finite_or_zero(config.nwc_pct);
        let axes = GridAxes {
            discount_rates: resolve_axis(&spec.discount_rates, config.default_discount_rate, || {
                discount_rate_for(set, config)
            }),
            growth_rates: resolve_axis(&spec.growth_rates, growth, || growth),
            terminal_multiples: resolve_axis(&spec.terminal_multiples, multiple, || multiple),
            capex_pcts: resolve_axis(&spec.capex_pcts, capex, || capex),
            nwc_pcts: resolve_axis(&spec.nwc_pcts, nwc, || nwc),
        };

        let limit = self.config.max_grid_points;
        let points = axes.cardinality().unwrap_or(usize::MAX);
        if points > limit {
            return Err(RoiError::GridTooLarge { points, limit });
        }

        let evaluate = |index: usize| {
            let point = axes.point(index);
            let swept = scenario
                .clone()
                .with_growth_rate(point.growth_rate)
                .with_terminal_multiple(point.terminal_multiple);
            let assumptions = CashflowAssumptions {
                years: horizon_years,
                capex_pct: point.capex_pct,
                nwc_pct: point.nwc_pct,
            };
            let (base_val, scen_val) =
                value_pair(baseline, &swept, point.discount_rate, &assumptions, &self.config.irr);

            SensitivityRow {
                discount_rate: point.discount_rate,
                growth_rate: point.growth_rate,
                terminal_multiple: point.terminal_multiple,
                capex_pct: point.capex_pct,
                nwc_pct: point.nwc_pct,
                baseline_npv: base_val.npv,
                scenario_npv: scen_val.npv,
                delta_npv: scen_val.npv - base_val.npv,
                scenario_irr: scen_val.irr,
                irr_status: scen_val.irr_status,
            }
        };

        // Indexed parallel collect keeps rows in grid order
        let rows: Vec<SensitivityRow> = if points >= self.config.parallel_threshold {
            log::info!("sweeping {} grid points for {} scenario in parallel", points, kind);
            (0..points).into_par_iter().map(evaluate).collect()
        } else {
            log::debug!("sweeping {} grid points for {} scenario", points, kind);
            (0..points).map(evaluate).collect()
        };

        let non_converged = rows
            .iter()
            .filter(|r| r.irr_status != IrrStatus::Converged)
            .count();
        if non_converged > 0 {
            log::debug!("{} of {} grid points have a best-effort IRR", non_converged, points);
        }

        Ok(rows)
    }
}
