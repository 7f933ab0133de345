//! # basicstats - Partitioned Descriptive Statistics
//!
//! basicstats computes count, minimum, maximum, mean and population standard
//! deviation over numeric datasets too large to hold in one place. Each
//! partition of the input is folded into a fixed-size [`PartialSummary`];
//! the summaries are then merged into one and the final statistics derived
//! from it.
//!
//! ## Quick Start
//!
//! ```rust
//! use basicstats::{PartitionAggregator, SummaryMerger};
//!
//! let aggregator = PartitionAggregator::default();
//! let first = aggregator.aggregate(1, ["2", "4", "4", "4"]).unwrap();
//! let second = aggregator.aggregate(5, ["5", "5", "7", "9"]).unwrap();
//!
//! let stats = SummaryMerger::default().merge([second, first]).unwrap();
//! let lines: Vec<String> = stats.records().iter().map(ToString::to_string).collect();
//! assert_eq!(lines, ["MIN: 2.0", "MAX: 9.0", "AVG: 5.0", "STDDEV: 2.0"]);
//! ```
//!
//! ## Running a job
//!
//! [`run_job`] drives the whole pipeline over a file with the local
//! [`runtime`]: the input is split into chunks, chunks are aggregated in
//! parallel, their encoded summaries are shuffled to the merger, and the
//! result lands in `<output_dir>/part-r-00000` followed by a `_SUCCESS`
//! marker.
//!
//! ```rust,no_run
//! use basicstats::prelude::*;
//!
//! # async fn example() -> StatsResult<()> {
//! let report = run_job(JobConfig::new("numbers.txt", "out").with_chunk_size(1000)).await?;
//! println!("{}", report.rendered);
//! # Ok(())
//! # }
//! ```
//!
//! ## Transport
//!
//! Summaries cross the stage boundary encoded by a [`codec::SummaryCodec`]:
//! either the `count|sum|min|max|sumOfSquares` pipe layout or JSON.

pub mod aggregator;
pub mod codec;
pub mod config;
pub mod error;
pub mod formatters;
pub mod job;
pub mod key;
pub mod logging;
pub mod merger;
pub mod prelude;
pub mod rounding;
pub mod runtime;
pub mod summary;

pub use aggregator::PartitionAggregator;
pub use codec::{SummaryCodec, WireFormat};
pub use config::{JobConfig, OutputFormat};
pub use error::{StatsError, StatsResult};
pub use job::{run_job, JobReport};
pub use key::{GroupKey, SUMMARY_KEY};
pub use merger::{FinalStatistics, OutputRecord, StatLabel, SummaryMerger};
pub use summary::PartialSummary;
