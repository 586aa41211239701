//! Yearly cash-flow series built from a projection

use crate::assumptions::Projection;
use crate::config::{DEFAULT_CAPEX_PCT, DEFAULT_HORIZON_YEARS, DEFAULT_NWC_PCT};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Terminal-value growth never exceeds this rate
pub const TERMINAL_GROWTH_CAP: f64 = 0.03;

/// Parameters of the cash-flow build that are not part of a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashflowAssumptions {
    /// Forecast horizon in years
    pub years: u32,
    /// Capital expenditure as a fraction of free cash flow
    pub capex_pct: f64,
    /// Net working capital as a fraction of free cash flow
    pub nwc_pct: f64,
}

impl Default for CashflowAssumptions {
    fn default() -> Self {
        Self {
            years: DEFAULT_HORIZON_YEARS,
            capex_pct: DEFAULT_CAPEX_PCT,
            nwc_pct: DEFAULT_NWC_PCT,
        }
    }
}

/// Signed yearly cash flows; index is the discounting exponent
///
/// Index 0 holds the initial investment, the last index carries the
/// terminal value on top of that year's flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashflowSeries(Vec<f64>);

impl CashflowSeries {
    pub fn new(flows: Vec<f64>) -> Self {
        Self(flows)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of sign changes, ignoring zero entries
    pub fn sign_changes(&self) -> usize {
        let signs: Vec<bool> = self
            .0
            .iter()
            .filter(|&&cf| cf != 0.0)
            .map(|&cf| cf > 0.0)
            .collect();
        signs.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl Index<usize> for CashflowSeries {
    type Output = f64;

    fn index(&self, t: usize) -> &f64 {
        &self.0[t]
    }
}

/// Build the cash-flow series for one projection
///
/// Year 1 starts from the free-cash-flow proxy and later years compound at
/// the projection's growth rate. Capex and working-capital drag are charged
/// on the magnitude of each year's flow, so they are always a cost. The
/// terminal value grows the final-year flow at `min(growth, 3%)` and applies
/// the terminal multiple. Never fails: unusable inputs resolve to their
/// defaults or to zero.
pub fn build_cashflows(projection: &Projection, assumptions: &CashflowAssumptions) -> CashflowSeries {
    let base = projection.free_cash_flow_proxy();
    let growth = projection.resolved_growth_rate();
    let multiple = projection.resolved_terminal_multiple();
    let capex_pct = finite_or_zero(assumptions.capex_pct);
    let nwc_pct = finite_or_zero(assumptions.nwc_pct);

    let years = assumptions.years as usize;
    let mut flows = Vec::with_capacity(years + 1);
    flows.push(projection.resolved_initial_investment());

    let mut fcf = base;
    for t in 1..=years {
        if t > 1 {
            fcf *= 1.0 + growth;
        }
        let drag = fcf.abs() * capex_pct + fcf.abs() * nwc_pct;
        flows.push(fcf - drag);
    }

    // With a zero-year horizon `fcf` is still the base proxy
    let terminal_growth = growth.min(TERMINAL_GROWTH_CAP);
    let terminal = fcf * (1.0 + terminal_growth) * multiple;
    flows[years] += terminal;

    CashflowSeries(flows)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
