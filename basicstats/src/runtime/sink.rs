//! Persisting job output to a directory.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::{StatsError, StatsResult};

/// Name of the single output part file.
pub const PART_FILE: &str = "part-r-00000";

/// Marker written once the part file is complete.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Writes job output into an output directory.
///
/// The directory is claimed before any work starts, so a job never runs only
/// to discover it cannot write its result. The part file and the success
/// marker are written only by [`OutputSink::commit`].
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
    overwrite: bool,
}

impl OutputSink {
    /// Creates a sink for `dir`.
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the part file.
    pub fn part_path(&self) -> PathBuf {
        self.dir.join(PART_FILE)
    }

    /// Ensures the directory exists and is empty.
    ///
    /// Fails with [`StatsError::OutputExists`] if it already exists and
    /// overwriting is disabled.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn prepare(&self) -> StatsResult<()> {
        if fs::try_exists(&self.dir).await? {
            if !self.overwrite {
                return Err(StatsError::OutputExists(self.dir.clone()));
            }
            warn!("Removing existing output directory");
            fs::remove_dir_all(&self.dir).await?;
        }
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes the output lines followed by the success marker.
    #[instrument(skip(self, contents), fields(dir = %self.dir.display()))]
    pub async fn commit(&self, contents: &str) -> StatsResult<PathBuf> {
        let part = self.part_path();
        let mut body = contents.to_string();
        if !body.is_empty() && !body.ends_with('\n') {
            body.push('\n');
        }
        fs::write(&part, body).await?;
        fs::write(self.dir.join(SUCCESS_MARKER), b"").await?;
        info!(path = %part.display(), "Wrote job output");
        Ok(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let sink = OutputSink::new(&out, false);

        sink.prepare().await.unwrap();
        let part = sink.commit("MIN: 1.0\nMAX: 2.0").await.unwrap();

        assert_eq!(part, out.join(PART_FILE));
        assert_eq!(
            std::fs::read_to_string(&part).unwrap(),
            "MIN: 1.0\nMAX: 2.0\n"
        );
        assert!(out.join(SUCCESS_MARKER).exists());
    }

    #[tokio::test]
    async fn test_existing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path(), false);
        assert!(matches!(
            sink.prepare().await,
            Err(StatsError::OutputExists(_))
        ));
    }

    #[tokio::test]
    async fn test_overwrite_clears_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale"), "old").unwrap();

        let sink = OutputSink::new(&out, true);
        sink.prepare().await.unwrap();

        assert!(out.exists());
        assert!(!out.join("stale").exists());
    }
}
