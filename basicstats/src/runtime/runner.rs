//! Driving the map and reduce stages over a chunked input.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{StatsError, StatsResult};
use crate::key::GroupKey;

use super::{Chunker, MapStage, PartialStore, ReduceStage};

type MapOutput = StatsResult<(usize, Vec<(GroupKey, String)>)>;

/// Configuration for [`LocalJobRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of chunks mapped concurrently.
    pub parallelism: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get(),
        }
    }
}

impl RunnerConfig {
    /// Sets the parallelism.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct JobOutcome<T> {
    /// Chunks mapped.
    pub chunks: usize,
    /// Records read across all chunks.
    pub records: u64,
    /// Encoded values handed from map to reduce.
    pub partials: usize,
    /// One reduce result per key, in key order.
    pub results: Vec<(GroupKey, T)>,
}

impl<T> JobOutcome<T> {
    /// Takes the reduce result for `key` out of the outcome.
    pub fn take_result(&mut self, key: GroupKey) -> Option<T> {
        let position = self.results.iter().position(|(k, _)| *k == key)?;
        Some(self.results.swap_remove(position).1)
    }
}

/// Runs a two-stage job on the local machine.
///
/// Each chunk is mapped on the blocking pool, with at most `parallelism`
/// chunks in flight. Reduce only starts once every map task has finished.
/// The first failing chunk aborts the rest and fails the run.
#[derive(Debug, Clone)]
pub struct LocalJobRunner {
    config: RunnerConfig,
}

impl LocalJobRunner {
    /// Creates a runner.
    pub fn new(config: RunnerConfig) -> StatsResult<Self> {
        if config.parallelism == 0 {
            return Err(StatsError::invalid_config("parallelism must be at least 1"));
        }
        Ok(Self { config })
    }

    /// The runner's configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Maps every chunk from `chunker`, shuffles through `store`, then reduces.
    #[instrument(skip_all, fields(map = map.name(), reduce = reduce.name(), parallelism = self.config.parallelism))]
    pub async fn run<R, M, D>(
        &self,
        chunker: &mut Chunker<R>,
        map: Arc<M>,
        reduce: Arc<D>,
        store: &dyn PartialStore,
    ) -> StatsResult<JobOutcome<D::Output>>
    where
        R: AsyncRead + Unpin,
        M: MapStage + 'static,
        D: ReduceStage + 'static,
    {
        info!("Starting map phase");
        let permits = Arc::new(Semaphore::new(self.config.parallelism));
        let mut tasks: JoinSet<MapOutput> = JoinSet::new();
        let mut chunks = 0usize;
        let mut records = 0u64;

        while let Some(chunk) = chunker.next_chunk().await? {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| StatsError::task(e.to_string()))?;

            while let Some(finished) = tasks.try_join_next() {
                Self::collect(&mut tasks, finished, store).await?;
            }

            chunks += 1;
            records += chunk.len() as u64;

            let map = Arc::clone(&map);
            tasks.spawn_blocking(move || -> MapOutput {
                let _permit = permit;
                let emitted = map.map_chunk(&chunk)?;
                Ok((chunk.index, emitted))
            });
        }

        while let Some(finished) = tasks.join_next().await {
            Self::collect(&mut tasks, finished, store).await?;
        }
        let partials = store.len().await;
        info!(chunks, records, partials, "Map phase complete");

        let mut grouped = store.group().await?;
        for key in reduce.expected_keys() {
            grouped.entry(key).or_default();
        }

        let mut results = Vec::with_capacity(grouped.len());
        for (key, values) in grouped {
            debug!(%key, values = values.len(), "Reducing key");
            let reduce = Arc::clone(&reduce);
            let output = tokio::task::spawn_blocking(move || reduce.reduce(key, values)).await??;
            results.push((key, output));
        }
        info!(keys = results.len(), "Reduce phase complete");

        Ok(JobOutcome {
            chunks,
            records,
            partials,
            results,
        })
    }

    async fn collect(
        tasks: &mut JoinSet<MapOutput>,
        finished: Result<MapOutput, tokio::task::JoinError>,
        store: &dyn PartialStore,
    ) -> StatsResult<()> {
        let (index, emitted) = match finished.map_err(StatsError::from).and_then(|r| r) {
            Ok(done) => done,
            Err(e) => {
                warn!(error = %e, pending = tasks.len(), "Map task failed, aborting remaining chunks");
                tasks.abort_all();
                return Err(e);
            }
        };

        debug!(chunk = index, values = emitted.len(), "Chunk mapped");
        for (key, payload) in emitted {
            store.put(index, key, payload).await?;
        }
        Ok(())
    }
}
