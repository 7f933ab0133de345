//! Holding map outputs until every chunk is done, then grouping them by key.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{StatsError, StatsResult};
use crate::key::GroupKey;

/// Values grouped under their key, each group in chunk order.
pub type Grouped = BTreeMap<GroupKey, Vec<String>>;

/// Storage for encoded map outputs between the two stages.
#[async_trait]
pub trait PartialStore: Send + Sync {
    /// Records one value emitted by the chunk at `chunk_index`.
    async fn put(&self, chunk_index: usize, key: GroupKey, payload: String) -> StatsResult<()>;

    /// Groups every stored value by key, ordered by chunk index within a key.
    async fn group(&self) -> StatsResult<Grouped>;

    /// Number of values stored.
    async fn len(&self) -> usize;
}

/// Keeps map outputs in memory.
#[derive(Clone, Default)]
pub struct InMemoryPartialStore {
    entries: Arc<RwLock<Vec<(usize, GroupKey, String)>>>,
}

impl InMemoryPartialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartialStore for InMemoryPartialStore {
    async fn put(&self, chunk_index: usize, key: GroupKey, payload: String) -> StatsResult<()> {
        self.entries.write().await.push((chunk_index, key, payload));
        Ok(())
    }

    async fn group(&self) -> StatsResult<Grouped> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by_key(|(index, _, _)| *index);

        let mut grouped = Grouped::new();
        for (_, key, payload) in entries {
            grouped.entry(key).or_default().push(payload);
        }
        Ok(grouped)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Persists each map output as a file and groups by reading them back.
///
/// Files are laid out one per emitted value:
/// ```text
/// base_path/
/// ├── chunk-00000-000
/// ├── chunk-00001-000
/// └── ...
/// ```
/// Each file holds `KEY<TAB>PAYLOAD` on a single line.
pub struct FileSystemPartialStore {
    base_path: PathBuf,
    keys: RwLock<HashMap<&'static str, GroupKey>>,
    sequence: RwLock<HashMap<usize, usize>>,
}

impl FileSystemPartialStore {
    /// Creates the store, making `base_path` if needed.
    pub async fn new(base_path: impl AsRef<Path>) -> StatsResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StatsError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot create partials directory {}: {e}", base_path.display()),
            ))
        })?;

        Ok(Self {
            base_path,
            keys: RwLock::new(HashMap::new()),
            sequence: RwLock::new(HashMap::new()),
        })
    }

    /// Directory the partials are written to.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, chunk_index: usize, seq: usize) -> PathBuf {
        self.base_path.join(format!("chunk-{chunk_index:05}-{seq:03}"))
    }

    async fn read_entry(&self, path: PathBuf) -> StatsResult<(GroupKey, String)> {
        let contents = fs::read_to_string(&path).await?;
        let line = contents.trim_end_matches('\n');
        let (label, payload) = line.split_once('\t').ok_or_else(|| {
            StatsError::decode(format!("{} has no key separator", path.display()))
        })?;

        let key = self.keys.read().await.get(label).copied().ok_or_else(|| {
            StatsError::decode(format!("{} carries unknown key {label:?}", path.display()))
        })?;
        Ok((key, payload.to_string()))
    }
}

#[async_trait]
impl PartialStore for FileSystemPartialStore {
    #[instrument(skip(self, payload))]
    async fn put(&self, chunk_index: usize, key: GroupKey, payload: String) -> StatsResult<()> {
        self.keys.write().await.insert(key.as_str(), key);

        let seq = {
            let mut sequence = self.sequence.write().await;
            let next = sequence.entry(chunk_index).or_insert(0);
            let seq = *next;
            *next += 1;
            seq
        };

        let path = self.file_path(chunk_index, seq);
        fs::write(&path, format!("{key}\t{payload}\n")).await?;
        debug!(path = %path.display(), "Persisted partial");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn group(&self) -> StatsResult<Grouped> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        // Zero-padded names sort in chunk order.
        paths.sort();

        let loaded =
            futures::future::try_join_all(paths.into_iter().map(|p| self.read_entry(p))).await?;

        let mut grouped = Grouped::new();
        for (key, payload) in loaded {
            grouped.entry(key).or_default().push(payload);
        }
        debug!(groups = grouped.len(), "Grouped persisted partials");
        Ok(grouped)
    }

    async fn len(&self) -> usize {
        self.sequence.read().await.values().sum()
    }
}
