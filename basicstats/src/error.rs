//! Error types for the aggregation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors that can occur while folding, merging, or running a job.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A record's text is not a finite number.
    #[error("Invalid record at line {line}: {record:?} ({reason})")]
    Parse {
        /// 1-based line number within the whole input.
        line: u64,
        /// The offending record text.
        record: String,
        /// Why the record was rejected.
        reason: String,
    },

    /// Zero records reached the merge step.
    #[error("No records reached the merge step; statistics are undefined")]
    EmptyInput,

    /// Missing or malformed operator input.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An intermediate payload could not be decoded.
    #[error("Malformed partial summary: {0}")]
    Decode(String),

    /// A derived statistic is NaN or infinite.
    #[error("Statistic {statistic} is not finite ({value})")]
    NonFiniteResult {
        /// Label of the statistic.
        statistic: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The output directory is already present.
    #[error("Output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A worker task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(String),
}

impl StatsError {
    /// Creates a parse error for the record at `line`.
    pub fn parse(line: u64, record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Creates a usage error with the given message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a task error with the given message.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Whether this error stems from bad operator input rather than a job failure.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::InvalidConfiguration(_))
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StatsError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Self::Task("worker task was cancelled".to_string())
        } else {
            Self::Task(format!("worker task panicked: {err}"))
        }
    }
}
