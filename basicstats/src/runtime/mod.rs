//! Local execution of a two-stage partial-aggregate/merge job.
//!
//! Input is split into [`Chunk`]s by a [`Chunker`]. A [`MapStage`] folds
//! each chunk into keyed, encoded values, which are shuffled through a
//! [`PartialStore`] and handed grouped by key to a [`ReduceStage`]. The
//! [`LocalJobRunner`] drives both stages and [`OutputSink`] persists the
//! result.

mod chunker;
mod runner;
mod shuffle;
mod sink;
mod stage;

pub use chunker::{Chunk, Chunker};
pub use runner::{JobOutcome, LocalJobRunner, RunnerConfig};
pub use shuffle::{FileSystemPartialStore, Grouped, InMemoryPartialStore, PartialStore};
pub use sink::{OutputSink, PART_FILE, SUCCESS_MARKER};
pub use stage::{MapStage, ReduceStage};
