//! Per-partition folding of raw text records into a [`PartialSummary`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::codec::{SummaryCodec, WireFormat};
use crate::error::{StatsError, StatsResult};
use crate::key::{GroupKey, SUMMARY_KEY};
use crate::runtime::{Chunk, MapStage};
use crate::summary::PartialSummary;

/// Folds one bounded chunk of records into a single summary.
///
/// Every chunk starts from a fresh, exclusively owned accumulator and the
/// summary is emitted once the chunk's records are exhausted, however many
/// there were. A record that is not a finite number fails the whole chunk.
///
/// # Example
///
/// ```
/// use basicstats::PartitionAggregator;
///
/// let aggregator = PartitionAggregator::default();
/// let summary = aggregator.aggregate(1, ["1", "2", "3", "4"]).unwrap();
///
/// assert_eq!(summary.count(), 4);
/// assert_eq!(summary.sum_of_squares(), 30.0);
///
/// assert!(aggregator.aggregate(1, ["1", "two"]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PartitionAggregator {
    codec: Arc<dyn SummaryCodec>,
}

impl Default for PartitionAggregator {
    fn default() -> Self {
        Self::new(WireFormat::default())
    }
}

impl PartitionAggregator {
    /// Creates an aggregator emitting summaries in the given wire format.
    pub fn new(wire_format: WireFormat) -> Self {
        Self {
            codec: Arc::from(wire_format.codec()),
        }
    }

    /// The key every summary is emitted under.
    pub fn key(&self) -> GroupKey {
        SUMMARY_KEY
    }

    /// Parses one record; `line` is its 1-based position in the whole input.
    pub fn parse_record(line: u64, text: &str) -> StatsResult<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StatsError::parse(line, text, "empty record"));
        }

        let value = trimmed
            .parse::<f64>()
            .map_err(|e| StatsError::parse(line, text, e.to_string()))?;

        if !value.is_finite() {
            return Err(StatsError::parse(line, text, "not a finite number"));
        }
        Ok(value)
    }

    /// Folds `records` into one summary; `first_line` numbers the first record.
    #[instrument(skip(self, records))]
    pub fn aggregate<I, S>(&self, first_line: u64, records: I) -> StatsResult<PartialSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let summary = records.into_iter().zip(first_line..).try_fold(
            PartialSummary::empty(),
            |acc, (record, line)| {
                let value = Self::parse_record(line, record.as_ref())?;
                Ok::<_, StatsError>(acc.with_value(value))
            },
        )?;
        summary.ensure_finite()?;

        debug!(
            count = summary.count(),
            sum = summary.sum(),
            "Folded partition"
        );
        Ok(summary)
    }
}

impl MapStage for PartitionAggregator {
    fn map_chunk(&self, chunk: &Chunk) -> StatsResult<Vec<(GroupKey, String)>> {
        let summary = self.aggregate(chunk.first_line, &chunk.records)?;
        let payload = self.codec.encode(&summary)?;
        Ok(vec![(self.key(), payload)])
    }

    fn name(&self) -> &str {
        "partition_aggregator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_single_chunk() {
        let summary = PartitionAggregator::default()
            .aggregate(1, ["1", "2", "3", "4"])
            .unwrap();
        assert_eq!(summary.count(), 4);
        assert_eq!(summary.sum(), 10.0);
        assert_eq!(summary.sum_of_squares(), 30.0);
        assert_eq!(summary.min(), Some(1.0));
        assert_eq!(summary.max(), Some(4.0));
    }

    #[test]
    fn test_accepts_standard_notation() {
        let summary = PartitionAggregator::default()
            .aggregate(1, ["3.14", "-2", "1e10", "  7  ", "+0.5"])
            .unwrap();
        assert_eq!(summary.count(), 5);
        assert_eq!(summary.min(), Some(-2.0));
        assert_eq!(summary.max(), Some(1e10));
    }

    #[test]
    fn test_partial_chunk_still_emits() {
        let summary = PartitionAggregator::default()
            .aggregate(201, ["42"])
            .unwrap();
        assert_eq!(summary.count(), 1);
        assert_eq!(summary.sum(), 42.0);
    }

    #[test]
    fn test_no_records_yields_empty_summary() {
        let summary = PartitionAggregator::default()
            .aggregate(1, Vec::<String>::new())
            .unwrap();
        assert_eq!(summary, PartialSummary::empty());
    }

    #[test]
    fn test_parse_error_reports_absolute_line() {
        let err = PartitionAggregator::default()
            .aggregate(401, ["1", "2", "oops", "4"])
            .unwrap_err();
        match err {
            StatsError::Parse { line, record, .. } => {
                assert_eq!(line, 403);
                assert_eq!(record, "oops");
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_finite_and_blank() {
        let aggregator = PartitionAggregator::default();
        for bad in ["NaN", "inf", "-infinity", "1e400", "", "   "] {
            assert!(
                matches!(
                    aggregator.aggregate(1, [bad]),
                    Err(StatsError::Parse { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overflowing_partition_fails() {
        let err = PartitionAggregator::default()
            .aggregate(1, ["1e200", "1e200"])
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::NonFiniteResult {
                statistic: "SUM_OF_SQUARES",
                ..
            }
        ));

        let chunk = Chunk {
            index: 0,
            first_line: 1,
            records: vec!["1e308".into(), "1e308".into()],
        };
        assert!(matches!(
            PartitionAggregator::default().map_chunk(&chunk),
            Err(StatsError::NonFiniteResult { statistic: "SUM", .. })
        ));
    }

    #[test]
    fn test_map_chunk_emits_one_keyed_payload() {
        let chunk = Chunk {
            index: 0,
            first_line: 1,
            records: vec!["1".into(), "2".into(), "3".into(), "4".into()],
        };
        let emitted = PartitionAggregator::default().map_chunk(&chunk).unwrap();
        assert_eq!(emitted, vec![(SUMMARY_KEY, "4|10|1|4|30".to_string())]);
    }

    #[test]
    fn test_map_chunk_json_wire_format() {
        let chunk = Chunk {
            index: 3,
            first_line: 601,
            records: vec!["2.5".into()],
        };
        let emitted = PartitionAggregator::new(WireFormat::Json)
            .map_chunk(&chunk)
            .unwrap();
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].1.starts_with('{'));
    }
}
