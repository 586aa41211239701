//! Internal Rate of Return (IRR) calculation
//!
//! Damped Newton-Raphson on the NPV of a yearly series. The solver is
//! best-effort: it always returns a rate, and reports whether that rate
//! actually converged so callers can decide how far to trust it. Series
//! with several sign changes may have several roots or none.

use super::discount::npv_and_derivative;
use serde::{Deserialize, Serialize};

/// Stand-in for a derivative that evaluates to exactly zero
const ZERO_DERIVATIVE_SUBSTITUTE: f64 = 1e-9;

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrConfig {
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,

    /// Convergence threshold on the step size
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Lowest rate an iterate may take; keeps `1 + r` positive
    #[serde(default = "default_rate_floor")]
    pub rate_floor: f64,
}

fn default_initial_guess() -> f64 { 0.10 }
fn default_tolerance() -> f64 { 1e-7 }
fn default_max_iterations() -> u32 { 100 }
fn default_rate_floor() -> f64 { -0.99 }

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            initial_guess: default_initial_guess(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            rate_floor: default_rate_floor(),
        }
    }
}

/// How the solver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrStatus {
    /// Step size fell below the tolerance
    Converged,
    /// Ran out of iterations; rate is the last iterate
    IterationLimit,
    /// The next step was not a finite number; rate is the last finite iterate
    NonFinite,
}

/// A solved (or best-effort) IRR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrEstimate {
    pub rate: f64,
    pub iterations: u32,
    pub status: IrrStatus,
}

impl IrrEstimate {
    pub fn converged(&self) -> bool {
        self.status == IrrStatus::Converged
    }
}

/// Solve for the rate that zeroes the NPV of `cashflows`
pub fn solve_irr(cashflows: &[f64], config: &IrrConfig) -> IrrEstimate {
    let mut rate = if config.initial_guess.is_finite() {
        config.initial_guess
    } else {
        default_initial_guess()
    };

    for iteration in 1..=config.max_iterations {
        let (value, mut slope) = npv_and_derivative(rate, cashflows);
        if slope == 0.0 {
            slope = ZERO_DERIVATIVE_SUBSTITUTE;
        }

        let next = rate - value / slope;
        if !next.is_finite() {
            log::debug!("IRR step became non-finite after {} iterations at rate {}", iteration, rate);
            return IrrEstimate {
                rate,
                iterations: iteration,
                status: IrrStatus::NonFinite,
            };
        }

        let next = next.max(config.rate_floor);
        if (next - rate).abs() < config.tolerance {
            return IrrEstimate {
                rate: next,
                iterations: iteration,
                status: IrrStatus::Converged,
            };
        }

        rate = next;
    }

    log::debug!(
        "IRR did not converge within {} iterations; returning last iterate {}",
        config.max_iterations,
        rate
    );

    IrrEstimate {
        rate,
        iterations: config.max_iterations,
        status: IrrStatus::IterationLimit,
    }
}

/// IRR with default settings, rate only
pub fn calculate_irr(cashflows: &[f64]) -> f64 {
    solve_irr(cashflows, &IrrConfig::default()).rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::discount::npv;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_single_period() {
        let estimate = solve_irr(&[-100.0, 130.0], &IrrConfig::default());
        assert!(estimate.converged());
        assert_abs_diff_eq!(estimate.rate, 0.30, epsilon = 1e-6);
    }

    #[test]
    fn test_level_annuity() {
        // 1000 out, 5 x 300 back: IRR ~15.24%
        let flows = [-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0];
        let rate = calculate_irr(&flows);
        assert_abs_diff_eq!(npv(rate, &flows), 0.0, epsilon = 1e-6);
        assert!((rate - 0.1524).abs() < 1e-3, "unexpected IRR {}", rate);
    }

    #[test]
    fn test_custom_guess() {
        let config = IrrConfig { initial_guess: 0.5, ..IrrConfig::default() };
        let estimate = solve_irr(&[-100.0, 130.0], &config);
        assert_abs_diff_eq!(estimate.rate, 0.30, epsilon = 1e-6);
    }

    #[test]
    fn test_no_root_still_returns_finite_rate() {
        // NPV is positive at every rate; iterates run off toward +inf until
        // the derivative underflows and the step vanishes next to the rate.
        // The solver then reports convergence at a rate that is not a root.
        let flows = [100.0, 100.0, 100.0];
        let estimate = solve_irr(&flows, &IrrConfig::default());
        assert_eq!(estimate.status, IrrStatus::Converged);
        assert!(estimate.rate.is_finite());
        assert!(estimate.rate > 1.0);
        assert!(npv(estimate.rate, &flows) > 99.0);
    }

    #[test]
    fn test_non_finite_step_reported() {
        // Huge NPV over a tiny slope: the first step overflows
        let estimate = solve_irr(&[1e308, 1e-300], &IrrConfig::default());
        assert_eq!(estimate.status, IrrStatus::NonFinite);
        assert_eq!(estimate.iterations, 1);
        assert_eq!(estimate.rate, 0.10);
        assert!(!estimate.converged());

        let estimate = solve_irr(&[f64::NAN, 50.0], &IrrConfig::default());
        assert_eq!(estimate.status, IrrStatus::NonFinite);
        assert_eq!(estimate.rate, 0.10);
    }

    #[test]
    fn test_iteration_limit_reported() {
        let config = IrrConfig { max_iterations: 2, ..IrrConfig::default() };
        let estimate = solve_irr(&[-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0], &config);
        assert_eq!(estimate.status, IrrStatus::IterationLimit);
        assert_eq!(estimate.iterations, 2);
    }

    #[test]
    fn test_rate_floor_holds() {
        // Large loss: the root is near -90%, iterates must stay above the floor
        let estimate = solve_irr(&[-1000.0, 100.0], &IrrConfig::default());
        assert!(estimate.rate >= -0.99);
        assert_abs_diff_eq!(estimate.rate, -0.90, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_series_uses_derivative_substitute() {
        let estimate = solve_irr(&[0.0, 0.0, 0.0], &IrrConfig::default());
        // value 0, slope replaced by 1e-9: step is zero, converges at the guess
        assert!(estimate.converged());
        assert_abs_diff_eq!(estimate.rate, 0.10);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&IrrStatus::IterationLimit).unwrap();
        assert_eq!(json, "\"iteration_limit\"");
    }

    proptest! {
        #[test]
        fn npv_at_irr_is_zero_for_conventional_series(
            outlay in 100.0f64..1000.0,
            inflows in prop::collection::vec(10.0f64..400.0, 1..7),
        ) {
            let mut flows = vec![-outlay];
            flows.extend(inflows);

            let estimate = solve_irr(&flows, &IrrConfig::default());
            prop_assert!(estimate.converged(), "status {:?} for {:?}", estimate.status, flows);
            prop_assert!(npv(estimate.rate, &flows).abs() < 1e-4);
        }
    }
}
