//! Partial summaries: the fixed-size state folded per partition.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Fixed-size fold result of one partition: count, sum, sum of squares, min and max.
///
/// An empty summary has no min or max at all, so it can never win a
/// comparison against a summary that has seen values.
///
/// # Example
///
/// ```
/// use basicstats::PartialSummary;
///
/// let summary = [1.0, 2.0, 3.0, 4.0]
///     .into_iter()
///     .fold(PartialSummary::empty(), PartialSummary::with_value);
///
/// assert_eq!(summary.count(), 4);
/// assert_eq!(summary.sum(), 10.0);
/// assert_eq!(summary.sum_of_squares(), 30.0);
/// assert_eq!(summary.min(), Some(1.0));
/// assert_eq!(summary.max(), Some(4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialSummary {
    count: u64,
    sum: f64,
    sum_of_squares: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Default for PartialSummary {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialSummary {
    /// Creates the summary of zero values.
    pub const fn empty() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_of_squares: 0.0,
            min: None,
            max: None,
        }
    }

    /// Rebuilds a summary from its parts, checking every invariant.
    pub fn from_parts(
        count: u64,
        sum: f64,
        sum_of_squares: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> StatsResult<Self> {
        let summary = Self {
            count,
            sum,
            sum_of_squares,
            min,
            max,
        };
        summary.validate()?;
        Ok(summary)
    }

    /// Folds one value into the summary.
    pub fn with_value(self, value: f64) -> Self {
        Self {
            count: self.count + 1,
            sum: self.sum + value,
            sum_of_squares: self.sum_of_squares + value * value,
            min: Some(self.min.map_or(value, |m| m.min(value))),
            max: Some(self.max.map_or(value, |m| m.max(value))),
        }
    }

    /// Combines two summaries without revisiting raw values.
    pub fn combine(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            sum_of_squares: self.sum_of_squares + other.sum_of_squares,
            min: pick(self.min, other.min, f64::min),
            max: pick(self.max, other.max, f64::max),
        }
    }

    /// Number of values folded in.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Sum of squared values.
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Smallest value seen, if any.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Largest value seen, if any.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Arithmetic mean, undefined for an empty summary.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Population variance `E[X²] - E[X]²`, undefined for an empty summary.
    pub fn population_variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        let mean_of_squares = self.sum_of_squares / self.count as f64;
        // Cancellation can push constant data slightly below zero.
        Some((mean_of_squares - mean * mean).max(0.0))
    }

    /// Population standard deviation, undefined for an empty summary.
    pub fn population_std_dev(&self) -> Option<f64> {
        self.population_variance().map(f64::sqrt)
    }

    /// Fails with [`StatsError::NonFiniteResult`] if the sums overflowed.
    pub fn ensure_finite(&self) -> StatsResult<()> {
        if !self.sum.is_finite() {
            return Err(StatsError::NonFiniteResult {
                statistic: "SUM",
                value: self.sum,
            });
        }
        if !self.sum_of_squares.is_finite() {
            return Err(StatsError::NonFiniteResult {
                statistic: "SUM_OF_SQUARES",
                value: self.sum_of_squares,
            });
        }
        Ok(())
    }

    /// Checks the structural invariants of a summary.
    pub fn validate(&self) -> StatsResult<()> {
        if !self.sum.is_finite() || !self.sum_of_squares.is_finite() {
            return Err(StatsError::decode("sum and sum of squares must be finite"));
        }
        if self.sum_of_squares < 0.0 {
            return Err(StatsError::decode(format!(
                "sum of squares must not be negative, got {}",
                self.sum_of_squares
            )));
        }

        match (self.count, self.min, self.max) {
            (0, None, None) => {
                if self.sum != 0.0 || self.sum_of_squares != 0.0 {
                    return Err(StatsError::decode(
                        "empty summary must have zero sum and sum of squares",
                    ));
                }
                Ok(())
            }
            (0, _, _) => Err(StatsError::decode("empty summary must not carry min or max")),
            (_, Some(min), Some(max)) => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(StatsError::decode("min and max must be finite"));
                }
                if min > max {
                    return Err(StatsError::decode(format!(
                        "min {min} is greater than max {max}"
                    )));
                }
                Ok(())
            }
            (count, _, _) => Err(StatsError::decode(format!(
                "summary of {count} values is missing min or max"
            ))),
        }
    }
}

fn pick(a: Option<f64>, b: Option<f64>, choose: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(choose(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}
