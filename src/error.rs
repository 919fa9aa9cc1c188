//! Error types for loading, validating and allocating.

use crate::instance::DemandType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AllocationError>;

/// Every failure the allocation pipeline can report.
///
/// Validation failures (`Schema`, `InvalidValue`, `UnknownReference`) are raised
/// before any allocation starts. `Capacity` signals a broken allocator invariant.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Missing required columns in {table}: {}", .missing.join(", "))]
    Schema { table: String, missing: Vec<String> },

    #[error("Invalid value in {table}, row {row}, column {column}: {value:?} ({reason})")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("OD matrix row {row}: {column} {name:?} does not match any municipality NAME")]
    UnknownReference {
        row: usize,
        column: String,
        name: String,
    },

    #[error(
        "Cannot move {requested} from {origin} to {destination} ({demand_type}): only {available} left"
    )]
    Capacity {
        origin: String,
        destination: String,
        demand_type: DemandType,
        requested: f64,
        available: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
