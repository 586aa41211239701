//! Weighted competitive index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MARKET_SHARE_WEIGHT: f64 = 0.30;
pub const NPS_WEIGHT: f64 = 0.25;
pub const WIN_LOSS_WEIGHT: f64 = 0.25;
pub const BENCHMARK_WEIGHT: f64 = 0.20;

/// Inputs to the competitive index
///
/// `market_share`, `nps_score` and `win_loss_ratio` are on a 0-100 scale,
/// `competitor_benchmark` on 0-150. Values are trusted; only the final
/// weighted score is clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveMetrics {
    pub market_share: f64,
    pub nps_score: f64,
    pub win_loss_ratio: f64,
    pub competitor_benchmark: f64,
}

/// Competitive index on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitiveIndex(u8);

impl CompetitiveIndex {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl CompetitiveMetrics {
    /// Weighted sum before clamping
    pub fn weighted_sum(&self) -> f64 {
        MARKET_SHARE_WEIGHT * self.market_share
            + NPS_WEIGHT * self.nps_score
            + WIN_LOSS_WEIGHT * self.win_loss_ratio
            + BENCHMARK_WEIGHT * self.competitor_benchmark
    }

    /// Clamp the weighted sum to 0-100 and round to the nearest integer
    pub fn score(&self) -> CompetitiveIndex {
        let sum = self.weighted_sum();
        if sum.is_nan() {
            return CompetitiveIndex(0);
        }
        CompetitiveIndex(sum.clamp(0.0, 100.0).round() as u8)
    }
}

/// A score stamped for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveIndexRecord {
    pub score: CompetitiveIndex,
    pub metrics: CompetitiveMetrics,
    pub scored_at: DateTime<Utc>,
}

impl CompetitiveIndexRecord {
    /// Score `metrics`, stamping the result with the caller-supplied time
    pub fn new(metrics: CompetitiveMetrics, scored_at: DateTime<Utc>) -> Self {
        Self {
            score: metrics.score(),
            metrics,
            scored_at,
        }
    }
}
