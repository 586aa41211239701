//! Scenario-versus-baseline ROI comparison
//!
//! Builds the baseline and scenario cash-flow series with the same
//! accounting assumptions, values both at the set's discount rate, solves
//! the scenario IRR and reports the NPV delta as a percentage of the
//! baseline NPV.

use crate::assumptions::{Projection, ProjectionSet, ScenarioKind};
use crate::config::EngineConfig;
use crate::error::RoiError;
use crate::projection::{build_cashflows, npv, solve_irr, CashflowAssumptions, CashflowSeries, IrrConfig, IrrStatus};
use serde::{Deserialize, Serialize};

/// Baseline NPVs smaller than this in magnitude count as zero
pub const ZERO_NPV_EPSILON: f64 = 1e-9;

/// Baseline side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineValuation {
    pub cashflows: CashflowSeries,
    pub npv: f64,
}

/// Scenario side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValuation {
    pub cashflows: CashflowSeries,
    pub npv: f64,
    pub irr: f64,
    pub irr_status: IrrStatus,
    pub irr_iterations: u32,
}

/// Outcome of comparing one scenario against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRoiResult {
    pub discount_rate: f64,
    pub horizon_years: u32,
    pub scenario_kind: ScenarioKind,
    pub baseline: BaselineValuation,
    pub scenario: ScenarioValuation,
    /// `scenario.npv - baseline.npv`
    pub delta_npv: f64,
    /// Delta as a percentage of |baseline NPV|, two decimals
    pub scenario_roi_percent: f64,
}

/// Relative ROI of the scenario over the baseline, in percent
///
/// When the baseline NPV is effectively zero there is nothing to divide by:
/// the result is 100 if the scenario NPV is non-zero, else 0.
pub fn roi_percent(baseline_npv: f64, scenario_npv: f64) -> f64 {
    if baseline_npv.abs() < ZERO_NPV_EPSILON {
        return if scenario_npv != 0.0 { 100.0 } else { 0.0 };
    }
    let delta = scenario_npv - baseline_npv;
    round_to_cents(100.0 * delta / baseline_npv.abs())
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Baseline and scenario projections chosen from a set
pub(crate) fn resolve_pair(set: &ProjectionSet) -> Result<(&Projection, ScenarioKind, &Projection), RoiError> {
    match (set.baseline(), set.scenario()) {
        (Some(baseline), Some((kind, scenario))) => Ok((baseline, kind, scenario)),
        (None, None) => Err(RoiError::NoUsableProjection),
        (None, Some(_)) => Err(RoiError::MissingBaseline),
        (Some(_), None) => Err(RoiError::MissingScenario),
    }
}

/// Discount rate of a set, falling back (with a warning) when absent or non-finite
pub(crate) fn discount_rate_for(set: &ProjectionSet, config: &EngineConfig) -> f64 {
    let rate = set.resolved_discount_rate(config.default_discount_rate);
    if set.discount_rate != Some(rate) {
        log::warn!(
            "discount rate {:?} unusable, falling back to {}",
            set.discount_rate,
            rate
        );
    }
    rate
}

/// Reject horizons longer than the configured maximum
pub(crate) fn check_horizon(horizon_years: u32, config: &EngineConfig) -> Result<(), RoiError> {
    if horizon_years > config.max_horizon_years {
        return Err(RoiError::HorizonTooLong {
            years: horizon_years,
            limit: config.max_horizon_years,
        });
    }
    Ok(())
}

/// Value both sides of one comparison
pub(crate) fn value_pair(
    baseline: &Projection,
    scenario: &Projection,
    discount_rate: f64,
    assumptions: &CashflowAssumptions,
    irr_config: &IrrConfig,
) -> (BaselineValuation, ScenarioValuation) {
    let baseline_flows = build_cashflows(baseline, assumptions);
    let scenario_flows = build_cashflows(scenario, assumptions);

    let baseline_npv = npv(discount_rate, baseline_flows.as_slice());
    let scenario_npv = npv(discount_rate, scenario_flows.as_slice());
    let irr = solve_irr(scenario_flows.as_slice(), irr_config);
    let sign_changes = scenario_flows.sign_changes();
    if sign_changes > 1 {
        log::debug!(
            "scenario series has {} sign changes; IRR {} ({:?}) may not be unique",
            sign_changes,
            irr.rate,
            irr.status
        );
    }

    (
        BaselineValuation {
            cashflows: baseline_flows,
            npv: baseline_npv,
        },
        ScenarioValuation {
            cashflows: scenario_flows,
            npv: scenario_npv,
            irr: irr.rate,
            irr_status: irr.status,
            irr_iterations: irr.iterations,
        },
    )
}

/// Compares projection sets under a fixed engine configuration
///
/// # Example
/// ```
/// use scenario_roi::{Projection, ProjectionSet, ScenarioComparator, ScenarioKind};
///
/// let set = ProjectionSet::new(0.10)
///     .with(ScenarioKind::Baseline, Projection::from_net_income(100.0).with_initial_investment(-500.0))
///     .with(ScenarioKind::Realistic, Projection::from_net_income(130.0).with_initial_investment(-500.0));
///
/// let result = ScenarioComparator::new().compare(&set).unwrap();
/// assert!(result.delta_npv > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioComparator {
    config: EngineConfig,
}

impl ScenarioComparator {
    /// Comparator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compare the preferred scenario against the baseline over the configured horizon
    pub fn compare(&self, set: &ProjectionSet) -> Result<ScenarioRoiResult, RoiError> {
        self.compare_over(set, self.config.horizon_years)
    }

    /// Compare the preferred scenario against the baseline over `horizon_years`
    pub fn compare_over(&self, set: &ProjectionSet, horizon_years: u32) -> Result<ScenarioRoiResult, RoiError> {
        let (baseline, kind, scenario) = resolve_pair(set)?;
        check_horizon(horizon_years, &self.config)?;
        let discount_rate = discount_rate_for(set, &self.config);
        Ok(self.compare_projections(baseline, kind, scenario, discount_rate, horizon_years))
    }

    /// One result per present scenario (optimistic, realistic, pessimistic order)
    pub fn compare_all(&self, set: &ProjectionSet) -> Result<Vec<ScenarioRoiResult>, RoiError> {
        let (baseline, _, _) = resolve_pair(set)?;
        check_horizon(self.config.horizon_years, &self.config)?;
        let discount_rate = discount_rate_for(set, &self.config);

        Ok(ScenarioKind::SCENARIOS
            .into_iter()
            .filter_map(|kind| set.get(kind).map(|p| (kind, p)))
            .map(|(kind, scenario)| {
                self.compare_projections(baseline, kind, scenario, discount_rate, self.config.horizon_years)
            })
            .collect())
    }

    fn compare_projections(
        &self,
        baseline: &Projection,
        kind: ScenarioKind,
        scenario: &Projection,
        discount_rate: f64,
        horizon_years: u32,
    ) -> ScenarioRoiResult {
        let assumptions = self.config.with_horizon(horizon_years).cashflow_assumptions();
        let (baseline, scenario) = value_pair(baseline, scenario, discount_rate, &assumptions, &self.config.irr);

        ScenarioRoiResult {
            discount_rate,
            horizon_years,
            scenario_kind: kind,
            delta_npv: scenario.npv - baseline.npv,
            scenario_roi_percent: roi_percent(baseline.npv, scenario.npv),
            baseline,
            scenario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::discount_factor;
    use approx::assert_abs_diff_eq;

    fn reference_baseline() -> Projection {
        Projection::from_net_income(100.0)
            .with_initial_investment(-500.0)
            .with_growth_rate(0.03)
            .with_terminal_multiple(8.0)
    }

    fn reference_set() -> ProjectionSet {
        ProjectionSet::new(0.10)
            .with(ScenarioKind::Baseline, reference_baseline())
            .with(
                ScenarioKind::Realistic,
                Projection::from_net_income(130.0)
                    .with_initial_investment(-600.0)
                    .with_growth_rate(0.05),
            )
    }

    #[test]
    fn test_baseline_npv_matches_manual_discounting() {
        let result = ScenarioComparator::new().compare(&reference_set()).unwrap();

        let flows = result.baseline.cashflows.as_slice();
        assert_eq!(flows.len(), 6);
        assert_abs_diff_eq!(flows[0], -500.0);
        assert_abs_diff_eq!(flows[1], 96.0, epsilon = 1e-12);

        let f5 = 100.0 * 1.03_f64.powi(4);
        let terminal = f5 * 1.03 * 8.0;
        let mut manual = -500.0;
        for t in 1..=5 {
            let f_t = 100.0 * 1.03_f64.powi(t as i32 - 1);
            let mut flow = f_t * 0.96;
            if t == 5 {
                flow += terminal;
            }
            manual += flow * discount_factor(0.10, t);
        }
        assert_abs_diff_eq!(result.baseline.npv, manual, epsilon = 1e-6);
    }

    #[test]
    fn test_delta_and_roi_invariants() {
        let result = ScenarioComparator::new().compare(&reference_set()).unwrap();

        assert_eq!(result.scenario_kind, ScenarioKind::Realistic);
        assert_eq!(result.delta_npv, result.scenario.npv - result.baseline.npv);
        let expected = (100.0 * result.delta_npv / result.baseline.npv.abs() * 100.0).round() / 100.0;
        assert_eq!(result.scenario_roi_percent, expected);
        assert_eq!(result.horizon_years, 5);
        assert_eq!(result.discount_rate, 0.10);
        assert_eq!(result.scenario.irr_status, IrrStatus::Converged);
        assert_abs_diff_eq!(npv(result.scenario.irr, result.scenario.cashflows.as_slice()), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_idempotent() {
        let comparator = ScenarioComparator::new();
        let set = reference_set();
        let first = comparator.compare(&set).unwrap();
        let second = comparator.compare(&set).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.scenario.npv.to_bits(), second.scenario.npv.to_bits());
        assert_eq!(first.scenario.irr.to_bits(), second.scenario.irr.to_bits());
    }

    #[test]
    fn test_non_finite_discount_rate_defaults() {
        let mut set = reference_set();
        set.discount_rate = Some(f64::INFINITY);
        let result = ScenarioComparator::new().compare(&set).unwrap();
        assert_eq!(result.discount_rate, 0.10);

        set.discount_rate = None;
        let result = ScenarioComparator::new().compare(&set).unwrap();
        assert_eq!(result.discount_rate, 0.10);
    }

    #[test]
    fn test_zero_baseline_npv() {
        assert_eq!(roi_percent(0.0, 50.0), 100.0);
        assert_eq!(roi_percent(0.0, -50.0), 100.0);
        assert_eq!(roi_percent(1e-12, 0.0), 0.0);
        assert_eq!(roi_percent(-200.0, -100.0), 50.0);
        assert_eq!(roi_percent(300.0, 400.0), 33.33);

        // Empty baseline projection values to exactly zero
        let set = ProjectionSet::new(0.1)
            .with(ScenarioKind::Baseline, Projection::default())
            .with(ScenarioKind::Pessimistic, Projection::from_net_income(10.0));
        let result = ScenarioComparator::new().compare(&set).unwrap();
        assert_eq!(result.baseline.npv, 0.0);
        assert_eq!(result.scenario_roi_percent, 100.0);
    }

    #[test]
    fn test_missing_projections() {
        let comparator = ScenarioComparator::new();
        assert_eq!(comparator.compare(&ProjectionSet::new(0.1)), Err(RoiError::NoUsableProjection));

        let only_baseline = ProjectionSet::new(0.1).with(ScenarioKind::Baseline, reference_baseline());
        assert_eq!(comparator.compare(&only_baseline), Err(RoiError::MissingScenario));

        let only_scenario = ProjectionSet::new(0.1).with(ScenarioKind::Optimistic, reference_baseline());
        assert_eq!(comparator.compare(&only_scenario), Err(RoiError::MissingBaseline));
    }

    #[test]
    fn test_horizon_override() {
        let result = ScenarioComparator::new().compare_over(&reference_set(), 10).unwrap();
        assert_eq!(result.horizon_years, 10);
        assert_eq!(result.baseline.cashflows.len(), 11);
        assert_eq!(result.scenario.cashflows.len(), 11);
    }

    #[test]
    fn test_horizon_beyond_limit_rejected() {
        let comparator = ScenarioComparator::new();
        assert_eq!(
            comparator.compare_over(&reference_set(), u32::MAX),
            Err(RoiError::HorizonTooLong { years: u32::MAX, limit: 100 })
        );
        assert_eq!(comparator.compare_over(&reference_set(), 100).map(|r| r.horizon_years), Ok(100));

        let long = ScenarioComparator::with_config(EngineConfig::default().with_horizon(101));
        assert!(matches!(long.compare_all(&reference_set()), Err(RoiError::HorizonTooLong { years: 101, .. })));
    }

    #[test]
    fn test_compare_all_reports_each_scenario() {
        let set = reference_set()
            .with(ScenarioKind::Optimistic, Projection::from_net_income(160.0).with_initial_investment(-600.0))
            .with(ScenarioKind::Pessimistic, Projection::from_net_income(80.0).with_initial_investment(-600.0));

        let results = ScenarioComparator::new().compare_all(&set).unwrap();
        let kinds: Vec<_> = results.iter().map(|r| r.scenario_kind).collect();
        assert_eq!(kinds, vec![ScenarioKind::Optimistic, ScenarioKind::Realistic, ScenarioKind::Pessimistic]);
        assert!(results[0].scenario.npv > results[1].scenario.npv);
        assert!(results[1].scenario.npv > results[2].scenario.npv);

        // The realistic entry is the same comparison `compare` makes
        assert_eq!(results[1], ScenarioComparator::new().compare(&set).unwrap());
    }

    #[test]
    fn test_result_json_shape() {
        let result = ScenarioComparator::new().compare(&reference_set()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["scenario_kind"], "realistic");
        assert_eq!(value["baseline"]["cashflows"].as_array().map(Vec::len), Some(6));
        assert_eq!(value["scenario"]["irr_status"], "converged");
    }
}
