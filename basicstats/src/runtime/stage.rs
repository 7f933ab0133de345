//! The two stage contracts the local runtime drives.

use crate::error::StatsResult;
use crate::key::GroupKey;

use super::Chunk;

/// Per-chunk folding function.
///
/// The runtime calls [`MapStage::map_chunk`] exactly once per chunk, possibly
/// from many threads at once, and only ever sees the encoded payloads it
/// returns.
pub trait MapStage: Send + Sync {
    /// Folds one chunk into keyed, encoded values.
    fn map_chunk(&self, chunk: &Chunk) -> StatsResult<Vec<(GroupKey, String)>>;

    /// Returns the name of this stage.
    fn name(&self) -> &str;
}

/// Merge function invoked once per key after every chunk has been mapped.
pub trait ReduceStage: Send + Sync {
    /// What one reduce invocation produces.
    type Output: Send + 'static;

    /// Merges every value emitted under `key`.
    fn reduce(&self, key: GroupKey, values: Vec<String>) -> StatsResult<Self::Output>;

    /// Keys that must be reduced even when no values arrived for them.
    fn expected_keys(&self) -> Vec<GroupKey> {
        Vec::new()
    }

    /// Returns the name of this stage.
    fn name(&self) -> &str;
}
