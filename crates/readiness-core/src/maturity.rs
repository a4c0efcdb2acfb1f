//! Maturity buckets and the score thresholds that classify into them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReadinessError;
use crate::types::normalize_tag;

/// Four ordinal maturity buckets, `Basic < Emerging < Established < WorldClass`.
///
/// Serialized as the report label ("World Class"). Deserialization also
/// accepts option tags ("WORLD_CLASS") so older stored results still load.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "&'static str", try_from = "String")]
pub enum MaturityLevel {
    #[default]
    Basic,
    Emerging,
    Established,
    WorldClass,
}

impl MaturityLevel {
    /// Case-insensitive parse of an option value tag. Accepts `WORLD_CLASS`,
    /// `world class` and `World-Class` alike.
    pub fn from_tag(tag: &str) -> Option<MaturityLevel> {
        match normalize_tag(tag).as_str() {
            "BASIC" => Some(MaturityLevel::Basic),
            "EMERGING" => Some(MaturityLevel::Emerging),
            "ESTABLISHED" => Some(MaturityLevel::Established),
            "WORLD_CLASS" | "WORLDCLASS" => Some(MaturityLevel::WorldClass),
            _ => None,
        }
    }

    /// Display label shown in reports.
    pub fn label(&self) -> &'static str {
        match self {
            MaturityLevel::Basic => "Basic",
            MaturityLevel::Emerging => "Emerging",
            MaturityLevel::Established => "Established",
            MaturityLevel::WorldClass => "World Class",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<MaturityLevel> for &'static str {
    fn from(level: MaturityLevel) -> Self {
        level.label()
    }
}

impl TryFrom<String> for MaturityLevel {
    type Error = ReadinessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MaturityLevel::from_tag(&value).ok_or_else(|| ReadinessError::InvalidInput {
            field: "maturity_level".into(),
            reason: format!("unknown maturity level '{}'", value),
        })
    }
}

/// Minimum final score for each bucket above `Basic`.
///
/// These are deliberately not aligned with the 25/50/75/100 point values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityThresholds {
    pub world_class: u32,
    pub established: u32,
    pub emerging: u32,
}

impl Default for MaturityThresholds {
    fn default() -> Self {
        MaturityThresholds {
            world_class: 85,
            established: 70,
            emerging: 50,
        }
    }
}

impl MaturityThresholds {
    pub fn classify(&self, score: u32) -> MaturityLevel {
        if score >= self.world_class {
            MaturityLevel::WorldClass
        } else if score >= self.established {
            MaturityLevel::Established
        } else if score >= self.emerging {
            MaturityLevel::Emerging
        } else {
            MaturityLevel::Basic
        }
    }

    pub(crate) fn is_descending(&self) -> bool {
        self.world_class > self.established && self.established > self.emerging
    }
}

/// How many responses fell in each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityBreakdown {
    pub basic: usize,
    pub emerging: usize,
    pub established: usize,
    pub world_class: usize,
    /// Responses whose tag matched no bucket. They score zero but still
    /// count towards the total.
    pub unrecognized: usize,
}

impl MaturityBreakdown {
    pub fn record(&mut self, level: Option<MaturityLevel>) {
        match level {
            Some(MaturityLevel::Basic) => self.basic += 1,
            Some(MaturityLevel::Emerging) => self.emerging += 1,
            Some(MaturityLevel::Established) => self.established += 1,
            Some(MaturityLevel::WorldClass) => self.world_class += 1,
            None => self.unrecognized += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.basic + self.emerging + self.established + self.world_class + self.unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_label_boundaries() {
        let t = MaturityThresholds::default();
        assert_eq!(t.classify(84), MaturityLevel::Established);
        assert_eq!(t.classify(85), MaturityLevel::WorldClass);
        assert_eq!(t.classify(49), MaturityLevel::Basic);
        assert_eq!(t.classify(50), MaturityLevel::Emerging);
        assert_eq!(t.classify(69), MaturityLevel::Emerging);
        assert_eq!(t.classify(70), MaturityLevel::Established);
        assert_eq!(t.classify(0), MaturityLevel::Basic);
        assert_eq!(t.classify(100), MaturityLevel::WorldClass);
    }

    #[test]
    fn test_levels_are_totally_ordered() {
        assert!(MaturityLevel::Basic < MaturityLevel::Emerging);
        assert!(MaturityLevel::Emerging < MaturityLevel::Established);
        assert!(MaturityLevel::Established < MaturityLevel::WorldClass);
    }

    #[test]
    fn test_from_tag_case_insensitive() {
        assert_eq!(MaturityLevel::from_tag("basic"), Some(MaturityLevel::Basic));
        assert_eq!(
            MaturityLevel::from_tag("World Class"),
            Some(MaturityLevel::WorldClass)
        );
        assert_eq!(
            MaturityLevel::from_tag(" established "),
            Some(MaturityLevel::Established)
        );
        assert_eq!(MaturityLevel::from_tag("ADVANCED"), None);
    }

    #[test]
    fn test_serializes_as_report_label() {
        let json = serde_json::to_string(&MaturityLevel::WorldClass).unwrap();
        assert_eq!(json, "\"World Class\"");
        assert_eq!(
            serde_json::to_string(&MaturityLevel::Basic).unwrap(),
            "\"Basic\""
        );
        assert_eq!(MaturityLevel::WorldClass.to_string(), "World Class");
    }

    #[test]
    fn test_deserializes_labels_and_legacy_tags() {
        let from_label: MaturityLevel = serde_json::from_str("\"World Class\"").unwrap();
        let from_tag: MaturityLevel = serde_json::from_str("\"WORLD_CLASS\"").unwrap();
        assert_eq!(from_label, MaturityLevel::WorldClass);
        assert_eq!(from_tag, MaturityLevel::WorldClass);
        let emerging: MaturityLevel = serde_json::from_str("\"emerging\"").unwrap();
        assert_eq!(emerging, MaturityLevel::Emerging);
        assert!(serde_json::from_str::<MaturityLevel>("\"Advanced\"").is_err());
    }

    #[test]
    fn test_breakdown_total() {
        let mut b = MaturityBreakdown::default();
        b.record(Some(MaturityLevel::Basic));
        b.record(Some(MaturityLevel::Basic));
        b.record(None);
        assert_eq!(b.basic, 2);
        assert_eq!(b.unrecognized, 1);
        assert_eq!(b.total(), 3);
    }

    proptest! {
        #[test]
        fn prop_classification_is_monotonic(a in 0u32..=100, b in 0u32..=100) {
            let t = MaturityThresholds::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.classify(lo) <= t.classify(hi));
        }
    }
}
