//! Error types for the ROI engine and its loaders

use thiserror::Error;

/// Failures surfaced by the comparison and sweep pipelines.
///
/// Numeric degeneracy (zero baseline NPV, a non-converging IRR, missing
/// optional fields) is never an error; it shows up as a specific value in
/// the result instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoiError {
    /// Neither a baseline nor any scenario projection was supplied.
    #[error("no usable projection data: baseline and scenario projections are both missing")]
    NoUsableProjection,

    /// A scenario projection exists but the baseline is missing.
    #[error("baseline projection is missing")]
    MissingBaseline,

    /// A baseline exists but none of realistic/optimistic/pessimistic is present.
    #[error("no scenario projection (realistic, optimistic or pessimistic) is present")]
    MissingScenario,

    /// The sweep would evaluate more grid points than the configured ceiling.
    #[error("sensitivity grid has {points} points, exceeding the limit of {limit}")]
    GridTooLarge { points: usize, limit: usize },

    /// The requested horizon is longer than the configured maximum.
    #[error("forecast horizon of {years} years exceeds the limit of {limit}")]
    HorizonTooLong { years: u32, limit: u32 },
}

/// Failures while reading a projection set from disk or a reader.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read projection file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid projection JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid projection CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown scenario label '{0}' (expected baseline, optimistic, realistic or pessimistic)")]
    UnknownScenario(String),

    #[error("invalid number '{value}' in column {column}")]
    InvalidNumber { column: &'static str, value: String },

    #[error("scenario '{0}' appears more than once")]
    DuplicateScenario(String),

    #[error("unsupported projection file extension: {0}")]
    UnsupportedFormat(String),
}
