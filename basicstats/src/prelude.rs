//! Prelude for commonly used types and traits in basicstats.

pub use crate::config::{JobConfig, OutputFormat};
pub use crate::error::{StatsError, StatsResult};
pub use crate::formatters::OutputFormatter;
pub use crate::job::{run_job, JobReport};
pub use crate::merger::{FinalStatistics, SummaryMerger};
pub use crate::summary::PartialSummary;
