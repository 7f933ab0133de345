//! Running the statistics job end to end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument};

use crate::aggregator::PartitionAggregator;
use crate::config::JobConfig;
use crate::error::{StatsError, StatsResult};
use crate::formatters::formatter_for;
use crate::key::SUMMARY_KEY;
use crate::merger::{FinalStatistics, SummaryMerger};
use crate::runtime::{
    Chunker, FileSystemPartialStore, InMemoryPartialStore, LocalJobRunner, OutputSink,
    PartialStore, RunnerConfig,
};

/// What a successful job did and produced.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub chunks: usize,
    pub records: u64,
    pub partials: usize,
    pub statistics: FinalStatistics,
    /// The written part file.
    pub output_path: PathBuf,
    /// The part file's contents.
    pub rendered: String,
    pub elapsed: Duration,
}

/// Reads the input, aggregates every chunk, merges the partials and writes
/// the final statistics.
///
/// Nothing is written to the part file or success marker unless the whole
/// job succeeds.
#[instrument(skip(config), fields(input = %config.input.display(), output = %config.output_dir.display()))]
pub async fn run_job(config: JobConfig) -> StatsResult<JobReport> {
    let started = Instant::now();
    config.validate()?;

    let mut chunker = Chunker::open(&config.input, config.chunk_size).await?;
    let sink = OutputSink::new(&config.output_dir, config.overwrite);
    sink.prepare().await?;

    let runner = LocalJobRunner::new(RunnerConfig::default().with_parallelism(config.parallelism))?;
    let aggregator = Arc::new(PartitionAggregator::new(config.wire_format));
    let merger = Arc::new(SummaryMerger::new(config.wire_format).with_precision(config.precision));

    let store: Box<dyn PartialStore> = if config.keep_partials {
        Box::new(FileSystemPartialStore::new(config.partials_dir()).await?)
    } else {
        Box::new(InMemoryPartialStore::new())
    };

    info!(
        chunk_size = config.chunk_size,
        parallelism = config.parallelism,
        wire_format = %config.wire_format,
        "Starting job"
    );
    let mut outcome = runner
        .run(&mut chunker, aggregator, merger, store.as_ref())
        .await?;

    let statistics = outcome
        .take_result(SUMMARY_KEY)
        .ok_or(StatsError::EmptyInput)?;
    let rendered = formatter_for(config.output_format).format(&statistics)?;
    let output_path = sink.commit(&rendered).await?;

    let elapsed = started.elapsed();
    info!(
        chunks = outcome.chunks,
        records = outcome.records,
        elapsed_ms = elapsed.as_millis() as u64,
        "Job complete"
    );

    Ok(JobReport {
        chunks: outcome.chunks,
        records: outcome.records,
        partials: outcome.partials,
        statistics,
        output_path,
        rendered,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_input_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = JobConfig::new(dir.path().join("missing.txt"), &out);

        assert!(matches!(run_job(config).await, Err(StatsError::Io(_))));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::new(dir.path().join("missing.txt"), dir.path().join("out"))
            .with_chunk_size(0);

        let err = run_job(config).await.unwrap_err();
        assert!(err.is_usage());
    }
}
