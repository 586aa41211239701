//! Scenario ROI Engine - cash-flow projection and return analysis for business scenarios
//!
//! This library provides:
//! - Yearly cash-flow series from EBITDA / net income projections, with terminal value
//! - NPV and best-effort IRR (damped Newton-Raphson)
//! - Scenario-versus-baseline ROI comparison
//! - Sensitivity sweeps over discount rate, growth, terminal multiple, capex and nwc
//! - A weighted competitive index score
//!
//! Everything is pure and synchronous; nothing is cached between calls.

pub mod assumptions;
pub mod competitive;
pub mod config;
pub mod error;
pub mod projection;
pub mod scenario;
pub mod sensitivity;

// Re-export commonly used types
pub use assumptions::{EstimationSource, Projection, ProjectionSet, ScenarioKind};
pub use competitive::{CompetitiveIndex, CompetitiveIndexRecord, CompetitiveMetrics};
pub use config::EngineConfig;
pub use error::{LoadError, RoiError};
pub use projection::{build_cashflows, npv, solve_irr, CashflowAssumptions, CashflowSeries, IrrEstimate, IrrStatus};
pub use scenario::{ScenarioComparator, ScenarioRoiResult};
pub use sensitivity::{SensitivityGrid, SensitivityRow, SweepSpec};
