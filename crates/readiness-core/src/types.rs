use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Points earned by a response or a scope of responses.
pub type Points = Decimal;

/// Percentages expressed on the 0-100 scale. Never as fractions.
pub type Percentage = Decimal;

/// Pillar weights expressed as fractions (0.40 = 40%).
pub type Weight = Decimal;

const PERCENT_MIN: Decimal = dec!(0);
const PERCENT_MAX: Decimal = dec!(100);

/// Top-level grouping of dimensions.
///
/// Questions whose catalog metadata names no pillar (or one this engine does
/// not know) land in `Unknown`, which carries no weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pillar {
    Digitalization,
    Transformation,
    ValueScaling,
    Unknown,
}

impl Pillar {
    /// The weighted pillars, in declaration order.
    pub const WEIGHTED: [Pillar; 3] = [
        Pillar::Digitalization,
        Pillar::Transformation,
        Pillar::ValueScaling,
    ];

    /// Lenient parse of a catalog metadata tag.
    pub fn from_tag(tag: &str) -> Pillar {
        match normalize_tag(tag).as_str() {
            "DIGITALIZATION" | "DIGITALISATION" => Pillar::Digitalization,
            "TRANSFORMATION" => Pillar::Transformation,
            "VALUE_SCALING" => Pillar::ValueScaling,
            _ => Pillar::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pillar::Digitalization => "Digitalization",
            Pillar::Transformation => "Transformation",
            Pillar::ValueScaling => "Value Scaling",
            Pillar::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single answer as it arrives from the caller.
///
/// Most flows send an option value tag; some send the point value directly.
/// Anything else is kept so it can be reported and skipped instead of
/// failing the whole submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Points(u32),
    Choice(String),
    Malformed(serde_json::Value),
}

impl ResponseValue {
    pub fn choice(tag: impl Into<String>) -> Self {
        ResponseValue::Choice(tag.into())
    }
}

/// Question id to answer. Ordered so aggregation never depends on the
/// order the caller supplied answers in.
pub type Responses = BTreeMap<String, ResponseValue>;

/// Build a response set from `(question_id, tag)` pairs.
pub fn tag_responses<I, K, V>(pairs: I) -> Responses
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), ResponseValue::Choice(v.into())))
        .collect()
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Round half away from zero to a whole number. Scores are never negative,
/// so this is the usual round-half-up.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to a whole 0-100 score.
pub fn to_whole_score(value: Decimal) -> u32 {
    clamp_percentage(round_half_up(value)).to_u32().unwrap_or(0)
}

/// Two decimal places, half up. The precision every reported percentage
/// and mean carries.
pub fn round_reporting(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `raw / max` on the 0-100 scale, two decimal places. Zero when nothing
/// was achievable.
pub fn percentage_of(raw: Points, max: Points) -> Percentage {
    if max <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    clamp_percentage(round_reporting(raw / max * dec!(100)))
}

pub fn clamp_percentage(value: Decimal) -> Decimal {
    if value < PERCENT_MIN {
        PERCENT_MIN
    } else if value > PERCENT_MAX {
        PERCENT_MAX
    } else {
        value
    }
}

/// Upper-case, and fold spaces and dashes into underscores.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
