//! Encoding of partial summaries for transport between stages.
//!
//! The pipe layout is the one other tools read: five fields in the order
//! `count|sum|min|max|sumOfSquares`. An unset min or max is an empty field.
//! Floats are written in their shortest round-trip form, so decoding an
//! encoded summary yields exactly the original value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::summary::PartialSummary;

/// Encode/decode contract for summaries crossing the transport boundary.
pub trait SummaryCodec: Send + Sync + fmt::Debug {
    /// Encodes a summary into its transport form.
    fn encode(&self, summary: &PartialSummary) -> StatsResult<String>;

    /// Decodes a transport payload, validating every invariant.
    fn decode(&self, payload: &str) -> StatsResult<PartialSummary>;

    /// Short name of the format.
    fn name(&self) -> &'static str;
}

/// Selects the transport encoding used between the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `count|sum|min|max|sumOfSquares`.
    #[default]
    Pipe,
    /// serde JSON object.
    Json,
}

impl WireFormat {
    /// Returns the codec implementing this format.
    pub fn codec(self) -> Box<dyn SummaryCodec> {
        match self {
            WireFormat::Pipe => Box::new(PipeCodec),
            WireFormat::Json => Box::new(JsonCodec),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Pipe => f.write_str("pipe"),
            WireFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pipe" => Ok(WireFormat::Pipe),
            "json" => Ok(WireFormat::Json),
            other => Err(StatsError::invalid_config(format!(
                "unknown wire format '{other}' (expected pipe or json)"
            ))),
        }
    }
}

/// The `|`-delimited five-field layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeCodec;

impl PipeCodec {
    const DELIMITER: char = '|';
    const FIELDS: usize = 5;
}

impl SummaryCodec for PipeCodec {
    fn encode(&self, summary: &PartialSummary) -> StatsResult<String> {
        let optional = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Ok(format!(
            "{count}{d}{sum}{d}{min}{d}{max}{d}{squares}",
            count = summary.count(),
            sum = summary.sum(),
            min = optional(summary.min()),
            max = optional(summary.max()),
            squares = summary.sum_of_squares(),
            d = Self::DELIMITER,
        ))
    }

    fn decode(&self, payload: &str) -> StatsResult<PartialSummary> {
        let fields: Vec<&str> = payload.trim().split(Self::DELIMITER).collect();
        if fields.len() != Self::FIELDS {
            return Err(StatsError::decode(format!(
                "expected {} fields, found {} in {payload:?}",
                Self::FIELDS,
                fields.len()
            )));
        }

        let count = fields[0]
            .parse::<u64>()
            .map_err(|e| StatsError::decode(format!("count {:?}: {e}", fields[0])))?;
        let sum = parse_float("sum", fields[1])?;
        let min = parse_optional("min", fields[2])?;
        let max = parse_optional("max", fields[3])?;
        let sum_of_squares = parse_float("sumOfSquares", fields[4])?;

        PartialSummary::from_parts(count, sum, sum_of_squares, min, max)
    }

    fn name(&self) -> &'static str {
        "pipe"
    }
}

fn parse_float(field: &str, text: &str) -> StatsResult<f64> {
    text.parse::<f64>()
        .map_err(|e| StatsError::decode(format!("{field} {text:?}: {e}")))
}

fn parse_optional(field: &str, text: &str) -> StatsResult<Option<f64>> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_float(field, text).map(Some)
    }
}

/// JSON encoding via serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SummaryCodec for JsonCodec {
    fn encode(&self, summary: &PartialSummary) -> StatsResult<String> {
        Ok(serde_json::to_string(summary)?)
    }

    fn decode(&self, payload: &str) -> StatsResult<PartialSummary> {
        let summary: PartialSummary = serde_json::from_str(payload)
            .map_err(|e| StatsError::decode(format!("invalid JSON summary: {e}")))?;
        summary.validate()?;
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
