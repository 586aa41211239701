//! Projection inputs: per-scenario assumptions and the set handed to the engine

mod projection;
pub mod loader;

pub use projection::{
    Projection, FcfSource, EBITDA_FCF_RATIO, DEFAULT_GROWTH_RATE, DEFAULT_TERMINAL_MULTIPLE,
};
pub use loader::{load_projection_set, load_projection_set_from_csv_reader, load_projection_set_from_json_reader};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a projection plays in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Baseline,
    Optimistic,
    Realistic,
    Pessimistic,
}

impl ScenarioKind {
    /// Every kind, baseline first
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Baseline,
        ScenarioKind::Optimistic,
        ScenarioKind::Realistic,
        ScenarioKind::Pessimistic,
    ];

    /// Order in which "the" scenario is chosen for a comparison
    pub const PREFERENCE: [ScenarioKind; 3] = [
        ScenarioKind::Realistic,
        ScenarioKind::Optimistic,
        ScenarioKind::Pessimistic,
    ];

    /// Non-baseline kinds in reporting order
    pub const SCENARIOS: [ScenarioKind; 3] = [
        ScenarioKind::Optimistic,
        ScenarioKind::Realistic,
        ScenarioKind::Pessimistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Baseline => "baseline",
            ScenarioKind::Optimistic => "optimistic",
            ScenarioKind::Realistic => "realistic",
            ScenarioKind::Pessimistic => "pessimistic",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(ScenarioKind::Baseline),
            "optimistic" => Ok(ScenarioKind::Optimistic),
            "realistic" => Ok(ScenarioKind::Realistic),
            "pessimistic" => Ok(ScenarioKind::Pessimistic),
            _ => Err(s.to_string()),
        }
    }
}

/// Baseline and scenario projections plus the discount rate to compare them at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Projection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<Projection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realistic: Option<Projection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessimistic: Option<Projection>,

    /// Annual discount rate as a fraction (0.10 = 10%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
}

impl ProjectionSet {
    pub fn new(discount_rate: f64) -> Self {
        Self {
            discount_rate: Some(discount_rate),
            ..Self::default()
        }
    }

    /// Set the projection for `kind`, replacing any previous one
    pub fn with(mut self, kind: ScenarioKind, projection: Projection) -> Self {
        self.set(kind, Some(projection));
        self
    }

    pub fn get(&self, kind: ScenarioKind) -> Option<&Projection> {
        match kind {
            ScenarioKind::Baseline => self.baseline.as_ref(),
            ScenarioKind::Optimistic => self.optimistic.as_ref(),
            ScenarioKind::Realistic => self.realistic.as_ref(),
            ScenarioKind::Pessimistic => self.pessimistic.as_ref(),
        }
    }

    pub fn set(&mut self, kind: ScenarioKind, projection: Option<Projection>) {
        let slot = match kind {
            ScenarioKind::Baseline => &mut self.baseline,
            ScenarioKind::Optimistic => &mut self.optimistic,
            ScenarioKind::Realistic => &mut self.realistic,
            ScenarioKind::Pessimistic => &mut self.pessimistic,
        };
        *slot = projection;
    }

    pub fn baseline(&self) -> Option<&Projection> {
        self.baseline.as_ref()
    }

    /// First present of realistic, optimistic, pessimistic
    pub fn scenario(&self) -> Option<(ScenarioKind, &Projection)> {
        ScenarioKind::PREFERENCE
            .into_iter()
            .find_map(|kind| self.get(kind).map(|p| (kind, p)))
    }

    /// Discount rate if finite, else `default`
    pub fn resolved_discount_rate(&self, default: f64) -> f64 {
        self.discount_rate.filter(|r| r.is_finite()).unwrap_or(default)
    }

    /// Kinds that are absent or carry no positive financial figure
    pub fn missing_or_degenerate(&self) -> Vec<ScenarioKind> {
        ScenarioKind::ALL
            .into_iter()
            .filter(|&kind| self.get(kind).map_or(true, Projection::is_degenerate))
            .collect()
    }

    /// Copy with every missing or degenerate projection replaced by the estimator's
    ///
    /// Kinds the estimator declines (returns `None` for) are left as they were.
    pub fn fill_with(&self, estimator: &dyn EstimationSource) -> Self {
        let mut filled = self.clone();
        for kind in self.missing_or_degenerate() {
            if let Some(estimate) = estimator.estimate(kind, self.get(kind)) {
                filled.set(kind, Some(estimate));
            }
        }
        filled
    }
}

/// External source of fallback projections (e.g. a text-generation service)
///
/// The engine never calls this on its own; hosts use
/// [`ProjectionSet::fill_with`] before handing a set to the comparator.
pub trait EstimationSource: Send + Sync {
    /// Produce a projection for `kind`, given whatever (possibly degenerate)
    /// projection is currently present
    fn estimate(&self, kind: ScenarioKind, current: Option<&Projection>) -> Option<Projection>;
}
