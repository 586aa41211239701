//! Cash-flow projection, discounting and IRR

mod cashflows;
mod discount;
mod irr;

pub use cashflows::{build_cashflows, CashflowAssumptions, CashflowSeries, TERMINAL_GROWTH_CAP};
pub use discount::{discount_factor, npv, npv_and_derivative, npv_derivative};
pub use irr::{calculate_irr, solve_irr, IrrConfig, IrrEstimate, IrrStatus};
