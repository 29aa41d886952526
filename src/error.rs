//! Error types for seedstat
//!
//! Two layers of failure:
//! - [`Error`]: run-level failures (I/O on the log or output directory,
//!   invalid configuration, table encoding). These abort the run.
//! - [`JobError`]: job-level failures (no result block, incomplete metric
//!   set). These never escape the job step; the job is skipped.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Run-level error types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid pipeline configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid argument to a library call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Log directory missing or not a directory
    #[error("Log directory not found: {0}\nPass --log-dir pointing at the directory holding the .out/.err files")]
    LogDirNotFound(String),

    /// Output table error (CSV/Parquet)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (config or run summary) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single job contributed no record.
///
/// Local to the job: the pipeline logs it, counts it, and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The log could not be read
    #[error("unreadable log: {0}")]
    Unreadable(String),

    /// No best-result banner anywhere in the log
    #[error("no result block")]
    NoResultBlock,

    /// The authoritative block has no `Test:` subsection
    #[error("result block has no test section")]
    MissingTestSection,

    /// A required metric is absent from the test subsection
    #[error("metric `{0}` missing from test section")]
    MissingMetric(String),

    /// A required metric is present but its value is not a number
    #[error("metric `{metric}` has unparsable value `{raw}`")]
    InvalidNumber {
        /// Metric name
        metric: String,
        /// Raw text that failed to parse
        raw: String,
    },
}

impl JobError {
    /// Short stable label used as a key in run statistics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unreadable(_) => "unreadable",
            Self::NoResultBlock => "no_result_block",
            Self::MissingTestSection => "missing_test_section",
            Self::MissingMetric(_) => "missing_metric",
            Self::InvalidNumber { .. } => "invalid_number",
        }
    }
}
