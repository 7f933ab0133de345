//! Splitting line-oriented input into bounded chunks.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

use crate::error::{StatsError, StatsResult};

/// A contiguous run of input records handed to one map invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based position of the chunk in the input.
    pub index: usize,
    /// 1-based line number of the first record.
    pub first_line: u64,
    /// Raw record text, one entry per line.
    pub records: Vec<String>,
}

impl Chunk {
    /// Number of records in the chunk.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chunk holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Streams an input source as chunks of at most `chunk_size` lines.
///
/// Only one chunk is held in memory at a time. The final chunk is yielded
/// even when it is shorter than `chunk_size`.
pub struct Chunker<R> {
    lines: Lines<BufReader<R>>,
    chunk_size: usize,
    next_index: usize,
    next_line: u64,
}

impl Chunker<File> {
    /// Opens a file for chunked reading.
    pub async fn open(path: impl AsRef<Path>, chunk_size: usize) -> StatsResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            StatsError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot open input {}: {e}", path.display()),
            ))
        })?;
        Self::new(file, chunk_size)
    }
}

impl<R: AsyncRead + Unpin> Chunker<R> {
    /// Wraps any async reader.
    pub fn new(reader: R, chunk_size: usize) -> StatsResult<Self> {
        if chunk_size == 0 {
            return Err(StatsError::invalid_config("chunk size must be at least 1"));
        }
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            chunk_size,
            next_index: 0,
            next_line: 1,
        })
    }

    /// Reads the next chunk, or `None` once the input is exhausted.
    pub async fn next_chunk(&mut self) -> StatsResult<Option<Chunk>> {
        let mut records = Vec::with_capacity(self.chunk_size);
        while records.len() < self.chunk_size {
            match self.lines.next_line().await? {
                Some(line) => records.push(line),
                None => break,
            }
        }

        if records.is_empty() {
            return Ok(None);
        }

        let chunk = Chunk {
            index: self.next_index,
            first_line: self.next_line,
            records,
        };
        self.next_index += 1;
        self.next_line += chunk.len() as u64;

        debug!(
            chunk = chunk.index,
            first_line = chunk.first_line,
            records = chunk.len(),
            "Read chunk"
        );
        Ok(Some(chunk))
    }
}
