//! Numeric parameter extraction
//!
//! Two independent passes run over each sentence. The range pass finds
//! `low-high` pairs, the value pass finds every number with an optional unit.
//! A number inside a range is also reported by the value pass; callers
//! decide what to keep. Numbers are ASCII digits with an optional single
//! decimal part. Signs and exponents are not recognised.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";
const RANGE_SEPARATORS: &str = r"[-~到至]";

/// A numeric range such as `0-250`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRange {
    /// Lower bound as written
    pub low: String,
    /// Upper bound as written
    pub high: String,
    /// Known unit directly after the upper bound
    pub unit: Option<String>,
}

/// A number with the unit that follows it, or an empty unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedValue {
    /// Number as written
    pub number: String,
    /// Unit, empty when none follows
    pub unit: String,
}

/// A number followed by a time unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDuration {
    /// Number as written
    pub value: String,
    /// Time unit
    pub unit: String,
}

/// Output of both passes over one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Ranges, left to right
    pub ranges: Vec<ExtractedRange>,
    /// Values, left to right
    pub values: Vec<ExtractedValue>,
}

/// Regex-driven extractor for ranges, values and durations
#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    range_pattern: Regex,
    value_pattern: Regex,
    duration_pattern: Option<Regex>,
}

impl ParameterExtractor {
    /// Compile the extraction patterns for a unit vocabulary
    ///
    /// Units are matched longest first, so `分钟` wins over a shorter prefix.
    pub fn new(units: &[String], time_units: &[String]) -> Result<Self, ParseError> {
        let unit_suffix = alternation(units)
            .map(|units| format!(r"(?:\s*({}))?", units))
            .unwrap_or_default();

        let range_pattern = compile(
            "range",
            &format!(r"{NUMBER}\s*{RANGE_SEPARATORS}\s*{NUMBER}{unit_suffix}"),
        )?;
        let value_pattern = compile("value", &format!("{NUMBER}{unit_suffix}"))?;
        let duration_pattern = match alternation(time_units) {
            Some(time_units) => Some(compile(
                "duration",
                &format!(r"{NUMBER}\s*({})", time_units),
            )?),
            None => None,
        };

        Ok(Self {
            range_pattern,
            value_pattern,
            duration_pattern,
        })
    }

    /// Run the range and value passes over one sentence
    pub fn extract(&self, sentence: &str) -> Extraction {
        Extraction {
            ranges: self.ranges(sentence),
            values: self.values(sentence),
        }
    }

    /// Every `low-high` range in the sentence
    pub fn ranges(&self, sentence: &str) -> Vec<ExtractedRange> {
        self.range_pattern
            .captures_iter(sentence)
            .map(|caps| ExtractedRange {
                low: caps[1].to_string(),
                high: caps[2].to_string(),
                unit: caps.get(3).map(|m| m.as_str().to_string()),
            })
            .collect()
    }

    /// Every number in the sentence with its unit, if one follows
    pub fn values(&self, sentence: &str) -> Vec<ExtractedValue> {
        self.value_pattern
            .captures_iter(sentence)
            .map(|caps| ExtractedValue {
                number: caps[1].to_string(),
                unit: caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Every number followed by a time unit
    pub fn durations(&self, sentence: &str) -> Vec<ExtractedDuration> {
        let Some(pattern) = &self.duration_pattern else {
            return Vec::new();
        };
        pattern
            .captures_iter(sentence)
            .map(|caps| ExtractedDuration {
                value: caps[1].to_string(),
                unit: caps[2].to_string(),
            })
            .collect()
    }
}

fn alternation(words: &[String]) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    let mut sorted: Vec<&String> = words.iter().collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    Some(
        sorted
            .into_iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|source| ParseError::InvalidPattern { name, source })
}
