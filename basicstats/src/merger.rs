//! Combining partial summaries and deriving the final statistics.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::codec::{SummaryCodec, WireFormat};
use crate::error::{StatsError, StatsResult};
use crate::key::{GroupKey, SUMMARY_KEY};
use crate::rounding::round_half_down;
use crate::runtime::ReduceStage;
use crate::summary::PartialSummary;

/// Decimal places kept for the mean and standard deviation by default.
pub const DEFAULT_PRECISION: u32 = 2;

/// Label of one output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatLabel {
    /// Smallest value seen.
    Min,
    /// Largest value seen.
    Max,
    /// Arithmetic mean.
    Avg,
    /// Population standard deviation.
    #[serde(rename = "STDDEV")]
    StdDev,
}

impl StatLabel {
    /// The label as written to output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatLabel::Min => "MIN",
            StatLabel::Max => "MAX",
            StatLabel::Avg => "AVG",
            StatLabel::StdDev => "STDDEV",
        }
    }
}

impl fmt::Display for StatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled line of job output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputRecord {
    pub label: StatLabel,
    pub value: f64,
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, format_value(self.value))
    }
}

/// Formats a statistic so that it always carries a decimal point.
///
/// Magnitudes in `[1e-3, 1e7)` print plainly; anything else uses
/// scientific notation with an upper-case `E`, as in `1.0E300`.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return if value.fract() == 0.0 {
            format!("{value:.1}")
        } else {
            value.to_string()
        };
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exponent}")
    } else {
        format!("{mantissa}.0E{exponent}")
    }
}

/// The derived statistics of a whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalStatistics {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    #[serde(rename = "avg")]
    pub mean: f64,
    pub stddev: f64,
}

impl FinalStatistics {
    /// The output records in emission order.
    pub fn records(&self) -> [OutputRecord; 4] {
        [
            OutputRecord {
                label: StatLabel::Min,
                value: self.min,
            },
            OutputRecord {
                label: StatLabel::Max,
                value: self.max,
            },
            OutputRecord {
                label: StatLabel::Avg,
                value: self.mean,
            },
            OutputRecord {
                label: StatLabel::StdDev,
                value: self.stddev,
            },
        ]
    }
}

/// Merges every partial summary of a dataset into its final statistics.
///
/// Partials may arrive in any order and grouping; the combined summary is the
/// same. The mean and standard deviation are rounded half-down to the
/// configured precision while min and max are reported as seen.
///
/// # Example
///
/// ```
/// use basicstats::{PartialSummary, SummaryMerger};
///
/// let fold = |values: &[f64]| {
///     values
///         .iter()
///         .copied()
///         .fold(PartialSummary::empty(), PartialSummary::with_value)
/// };
///
/// let stats = SummaryMerger::default()
///     .merge([fold(&[2.0, 4.0, 4.0]), fold(&[4.0, 5.0, 5.0]), fold(&[7.0, 9.0])])
///     .unwrap();
///
/// assert_eq!(stats.mean, 5.0);
/// assert_eq!(stats.stddev, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct SummaryMerger {
    codec: Arc<dyn SummaryCodec>,
    precision: u32,
}

impl Default for SummaryMerger {
    fn default() -> Self {
        Self::new(WireFormat::default())
    }
}

impl SummaryMerger {
    /// Creates a merger reading partials in the given wire format.
    pub fn new(wire_format: WireFormat) -> Self {
        Self {
            codec: Arc::from(wire_format.codec()),
            precision: DEFAULT_PRECISION,
        }
    }

    /// Sets the number of decimal places kept for mean and standard deviation.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Decimal places kept for mean and standard deviation.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Combines partials into one summary.
    pub fn combine<I>(&self, partials: I) -> PartialSummary
    where
        I: IntoIterator<Item = PartialSummary>,
    {
        partials
            .into_iter()
            .enumerate()
            .fold(PartialSummary::empty(), |acc, (index, partial)| {
                let merged = acc.combine(partial);
                debug!(
                    partial = index,
                    count = merged.count(),
                    sum = merged.sum(),
                    sum_of_squares = merged.sum_of_squares(),
                    min = ?merged.min(),
                    max = ?merged.max(),
                    "Merged partial summary"
                );
                merged
            })
    }

    /// Derives the final statistics from a combined summary.
    pub fn finalize(&self, combined: &PartialSummary) -> StatsResult<FinalStatistics> {
        let (Some(min), Some(max)) = (combined.min(), combined.max()) else {
            return Err(StatsError::EmptyInput);
        };
        if combined.count() == 0 {
            return Err(StatsError::EmptyInput);
        }

        ensure_finite(StatLabel::Min, min)?;
        ensure_finite(StatLabel::Max, max)?;
        // Overflowed squares would be masked by the variance clamp.
        combined.ensure_finite()?;

        let mean = combined.mean().ok_or(StatsError::EmptyInput)?;
        let stddev = combined.population_std_dev().ok_or(StatsError::EmptyInput)?;
        ensure_finite(StatLabel::Avg, mean)?;
        ensure_finite(StatLabel::StdDev, stddev)?;

        Ok(FinalStatistics {
            count: combined.count(),
            min,
            max,
            mean: round_half_down(mean, self.precision),
            stddev: round_half_down(stddev, self.precision),
        })
    }

    /// Combines partials and derives the final statistics.
    pub fn merge<I>(&self, partials: I) -> StatsResult<FinalStatistics>
    where
        I: IntoIterator<Item = PartialSummary>,
    {
        self.finalize(&self.combine(partials))
    }

    /// Decodes and merges encoded partials.
    #[instrument(skip(self, payloads), fields(codec = self.codec.name(), partials = payloads.len()))]
    pub fn merge_encoded(&self, payloads: &[String]) -> StatsResult<FinalStatistics> {
        let partials = payloads
            .iter()
            .map(|payload| self.codec.decode(payload))
            .collect::<StatsResult<Vec<_>>>()?;

        let stats = self.merge(partials)?;
        info!(
            count = stats.count,
            min = stats.min,
            max = stats.max,
            avg = stats.mean,
            stddev = stats.stddev,
            "Derived final statistics"
        );
        Ok(stats)
    }
}

fn ensure_finite(label: StatLabel, value: f64) -> StatsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StatsError::NonFiniteResult {
            statistic: label.as_str(),
            value,
        })
    }
}

impl ReduceStage for SummaryMerger {
    type Output = FinalStatistics;

    fn reduce(&self, key: GroupKey, values: Vec<String>) -> StatsResult<Self::Output> {
        if key != SUMMARY_KEY {
            return Err(StatsError::decode(format!("unexpected key {key}")));
        }
        self.merge_encoded(&values)
    }

    fn expected_keys(&self) -> Vec<GroupKey> {
        vec![SUMMARY_KEY]
    }

    fn name(&self) -> &str {
        "summary_merger"
    }
}
