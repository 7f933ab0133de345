//! Job configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::WireFormat;
use crate::error::{StatsError, StatsResult};
use crate::merger::DEFAULT_PRECISION;

/// Records folded per chunk by default.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Largest precision that still means something for an `f64`.
pub const MAX_PRECISION: u32 = 15;

/// How the final statistics are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `LABEL: value` lines.
    #[default]
    Text,
    /// A JSON object.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(StatsError::invalid_config(format!(
                "unknown output format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Everything needed to run one job.
///
/// # Example
///
/// ```
/// use basicstats::config::{JobConfig, OutputFormat};
///
/// let config = JobConfig::new("numbers.txt", "out")
///     .with_chunk_size(500)
///     .with_parallelism(4)
///     .with_output_format(OutputFormat::Json);
///
/// assert!(config.validate().is_ok());
/// assert!(config.with_chunk_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: usize,
    pub parallelism: usize,
    pub output_format: OutputFormat,
    pub wire_format: WireFormat,
    pub overwrite: bool,
    /// Persist encoded partials under `<output_dir>/_partials`.
    pub keep_partials: bool,
    /// Decimal places kept for mean and standard deviation.
    pub precision: u32,
}

impl JobConfig {
    /// Creates a configuration with default tunables.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: num_cpus::get(),
            output_format: OutputFormat::default(),
            wire_format: WireFormat::default(),
            overwrite: false,
            keep_partials: false,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_wire_format(mut self, format: WireFormat) -> Self {
        self.wire_format = format;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_keep_partials(mut self, keep: bool) -> Self {
        self.keep_partials = keep;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Directory partials are persisted to when `keep_partials` is set.
    pub fn partials_dir(&self) -> PathBuf {
        self.output_dir.join("_partials")
    }

    /// Checks the configuration for values no job could run with.
    pub fn validate(&self) -> StatsResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(StatsError::usage("input path is required"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(StatsError::usage("output directory is required"));
        }
        if self.chunk_size == 0 {
            return Err(StatsError::invalid_config("chunk size must be at least 1"));
        }
        if self.parallelism == 0 {
            return Err(StatsError::invalid_config("parallelism must be at least 1"));
        }
        if self.precision > MAX_PRECISION {
            return Err(StatsError::invalid_config(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        if same_path(&self.input, &self.output_dir) {
            return Err(StatsError::invalid_config(format!(
                "input and output must differ, both are {}",
                self.input.display()
            )));
        }
        Ok(())
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
