//! Rendering final statistics for the output file and the terminal.
//!
//! # Examples
//!
//! ```rust
//! use basicstats::formatters::{OutputFormatter, TextFormatter};
//! use basicstats::{PartialSummary, SummaryMerger};
//!
//! let summary = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
//!     .into_iter()
//!     .fold(PartialSummary::empty(), PartialSummary::with_value);
//! let stats = SummaryMerger::default().merge([summary]).unwrap();
//!
//! let output = TextFormatter::new().format(&stats).unwrap();
//! assert_eq!(output, "MIN: 2.0\nMAX: 9.0\nAVG: 5.0\nSTDDEV: 2.0\n");
//! ```

use std::fmt::Write;

use crate::config::OutputFormat;
use crate::error::StatsResult;
use crate::merger::FinalStatistics;

/// Turns final statistics into their rendered form.
pub trait OutputFormatter: Send + Sync {
    /// Renders the statistics.
    fn format(&self, stats: &FinalStatistics) -> StatsResult<String>;
}

/// Returns the formatter for an output format.
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

/// One `LABEL: value` line per statistic, in `MIN, MAX, AVG, STDDEV` order.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, stats: &FinalStatistics) -> StatsResult<String> {
        let mut output = String::new();
        for record in stats.records() {
            // Writing to a String cannot fail.
            let _ = writeln!(output, "{record}");
        }
        Ok(output)
    }
}

/// A JSON object with `count`, `min`, `max`, `avg` and `stddev`.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    /// Creates a formatter producing pretty-printed JSON.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, stats: &FinalStatistics) -> StatsResult<String> {
        let mut output = if self.pretty {
            serde_json::to_string_pretty(stats)?
        } else {
            serde_json::to_string(stats)?
        };
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FinalStatistics {
        FinalStatistics {
            count: 8,
            min: 2.0,
            max: 9.0,
            mean: 5.0,
            stddev: 2.0,
        }
    }

    #[test]
    fn test_text_format() {
        let output = TextFormatter::new().format(&sample()).unwrap();
        assert_eq!(output, "MIN: 2.0\nMAX: 9.0\nAVG: 5.0\nSTDDEV: 2.0\n");
    }

    #[test]
    fn test_text_format_fractions() {
        let stats = FinalStatistics {
            count: 3,
            min: -1.5,
            max: 0.25,
            mean: 0.12,
            stddev: 1.0,
        };
        let output = TextFormatter::new().format(&stats).unwrap();
        assert_eq!(output, "MIN: -1.5\nMAX: 0.25\nAVG: 0.12\nSTDDEV: 1.0\n");
    }

    #[test]
    fn test_json_format_compact() {
        let output = JsonFormatter::new()
            .with_pretty(false)
            .format(&sample())
            .unwrap();
        assert_eq!(
            output,
            "{\"count\":8,\"min\":2.0,\"max\":9.0,\"avg\":5.0,\"stddev\":2.0}\n"
        );
    }

    #[test]
    fn test_json_format_pretty_parses() {
        let output = JsonFormatter::new().format(&sample()).unwrap();
        assert!(output.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["avg"], 5.0);
        assert_eq!(value["count"], 8);
    }

    #[test]
    fn test_formatter_for() {
        let text = formatter_for(OutputFormat::Text).format(&sample()).unwrap();
        assert!(text.starts_with("MIN: "));
        let json = formatter_for(OutputFormat::Json).format(&sample()).unwrap();
        assert!(json.starts_with('{'));
    }
}
