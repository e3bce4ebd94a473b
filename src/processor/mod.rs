use std::path::PathBuf;
use thiserror::Error;

pub mod column;
pub mod mutation_table;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("The file {} was not found.", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Schema/parse error: {0}")]
    Parse(String),

    #[error("Malformed line {line}: expected {expected} fields, got {found}")]
    Malformed {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Cannot select an extremum of '{column}': no groups to aggregate")]
    EmptyAggregation { column: String },
}

/// Counts gathered while loading a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_processed: usize,
    pub columns_seen: usize,
}

/// Aggregate operations available to `group_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Number of rows in the group
    Count,
    /// Number of distinct present values in the group
    CountDistinct,
}

/// Ordered result of a grouped aggregation: one entry per key tuple.
pub type GroupedCounts = Vec<(Vec<String>, usize)>;
