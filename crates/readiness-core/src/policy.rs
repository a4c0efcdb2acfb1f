//! Scoring policy: every weight, threshold and point table the calculators
//! use, gathered in one place so catalog or policy changes never touch the
//! calculation code.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ReadinessError;
use crate::maturity::{MaturityLevel, MaturityThresholds};
use crate::types::{to_whole_score, Percentage, Pillar, Points, Weight};
use crate::ReadinessResult;

const WEIGHT_TOLERANCE: Decimal = dec!(0.0001);

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub thresholds: MaturityThresholds,
    pub tier1_points: Tier1Points,
    /// Points a single Tier-2 question can earn at most.
    pub tier2_max_points: Points,
    pub pillar_weights: PillarWeights,
    pub adjustment: ScoreShift,
    pub scenario: ScenarioRules,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy {
            thresholds: MaturityThresholds::default(),
            tier1_points: Tier1Points::default(),
            tier2_max_points: dec!(5),
            pillar_weights: PillarWeights::default(),
            adjustment: ScoreShift::default(),
            scenario: ScenarioRules::default(),
        }
    }
}

impl ScoringPolicy {
    /// Parse a (possibly partial) JSON policy over the defaults and validate it.
    pub fn from_json_str(json: &str) -> ReadinessResult<Self> {
        let policy: ScoringPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> ReadinessResult<()> {
        self.pillar_weights.validate()?;

        let t = &self.thresholds;
        if !t.is_descending() || t.world_class > 100 || t.emerging == 0 {
            return Err(ReadinessError::InvalidPolicy(format!(
                "Maturity thresholds must satisfy 100 >= world_class > established > emerging > 0 (got {}/{}/{}).",
                t.world_class, t.established, t.emerging
            )));
        }

        let p = &self.tier1_points;
        let ascending = p.basic < p.emerging && p.emerging < p.established && p.established < p.world_class;
        if !ascending || p.basic < Decimal::ZERO || p.world_class > dec!(100) {
            return Err(ReadinessError::InvalidPolicy(
                "Tier-1 points must ascend from basic to world_class within 0-100.".into(),
            ));
        }

        if self.tier2_max_points <= Decimal::ZERO {
            return Err(ReadinessError::InvalidPolicy(
                "tier2_max_points must be positive.".into(),
            ));
        }

        if self.adjustment.multiplier <= Decimal::ZERO {
            return Err(ReadinessError::InvalidPolicy(
                "Adjustment multiplier must be positive.".into(),
            ));
        }

        if self.scenario.balanced_spread < Decimal::ZERO {
            return Err(ReadinessError::InvalidPolicy(
                "Scenario balanced_spread must be non-negative.".into(),
            ));
        }

        Ok(())
    }

    pub fn classify(&self, score: u32) -> MaturityLevel {
        self.thresholds.classify(score)
    }
}

// ---------------------------------------------------------------------------
// Tier-1 point table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier1Points {
    pub basic: Points,
    pub emerging: Points,
    pub established: Points,
    pub world_class: Points,
}

impl Default for Tier1Points {
    fn default() -> Self {
        Tier1Points {
            basic: dec!(25),
            emerging: dec!(50),
            established: dec!(75),
            world_class: dec!(100),
        }
    }
}

impl Tier1Points {
    pub fn for_level(&self, level: MaturityLevel) -> Points {
        match level {
            MaturityLevel::Basic => self.basic,
            MaturityLevel::Emerging => self.emerging,
            MaturityLevel::Established => self.established,
            MaturityLevel::WorldClass => self.world_class,
        }
    }
}

// ---------------------------------------------------------------------------
// Pillar weights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarWeights {
    pub digitalization: Weight,
    pub transformation: Weight,
    pub value_scaling: Weight,
}

impl Default for PillarWeights {
    fn default() -> Self {
        PillarWeights {
            digitalization: dec!(0.40),
            transformation: dec!(0.30),
            value_scaling: dec!(0.30),
        }
    }
}

impl PillarWeights {
    /// Pillars outside the weighted set carry no weight.
    pub fn weight_for(&self, pillar: Pillar) -> Weight {
        match pillar {
            Pillar::Digitalization => self.digitalization,
            Pillar::Transformation => self.transformation,
            Pillar::ValueScaling => self.value_scaling,
            Pillar::Unknown => Decimal::ZERO,
        }
    }

    pub fn sum(&self) -> Weight {
        self.digitalization + self.transformation + self.value_scaling
    }

    pub fn validate(&self) -> ReadinessResult<()> {
        if self.digitalization < Decimal::ZERO
            || self.transformation < Decimal::ZERO
            || self.value_scaling < Decimal::ZERO
        {
            return Err(ReadinessError::InvalidPolicy(
                "Pillar weights must be non-negative.".into(),
            ));
        }
        let sum = self.sum();
        if (sum - dec!(1)).abs() > WEIGHT_TOLERANCE {
            return Err(ReadinessError::InvalidPolicy(format!(
                "Pillar weights must sum to 1.0 (got {}).",
                sum
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Final adjustment
// ---------------------------------------------------------------------------

/// The last step of Tier-2 scoring: turns the normalized score into the
/// number shown to end users.
pub trait ScoreAdjustment {
    fn adjust(&self, normalized: u32) -> u32;
}

/// `round(normalized * multiplier + offset)`, clamped to 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreShift {
    pub multiplier: Decimal,
    pub offset: Decimal,
}

impl Default for ScoreShift {
    fn default() -> Self {
        ScoreShift {
            multiplier: dec!(1),
            offset: dec!(0),
        }
    }
}

impl ScoreAdjustment for ScoreShift {
    fn adjust(&self, normalized: u32) -> u32 {
        to_whole_score(Decimal::from(normalized) * self.multiplier + self.offset)
    }
}

impl<F> ScoreAdjustment for F
where
    F: Fn(u32) -> u32,
{
    fn adjust(&self, normalized: u32) -> u32 {
        self(normalized).min(100)
    }
}

// ---------------------------------------------------------------------------
// Scenario lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioRules {
    /// Largest gap between strongest and weakest pillar percentage that
    /// still counts as balanced.
    pub balanced_spread: Percentage,
    pub not_assessed: String,
    pub balanced_leader: String,
    pub balanced_builder: String,
    pub early_explorer: String,
    pub digitalization_led: String,
    pub transformation_led: String,
    pub value_scaling_led: String,
}

impl Default for ScenarioRules {
    fn default() -> Self {
        ScenarioRules {
            balanced_spread: dec!(15),
            not_assessed: "Not Assessed".into(),
            balanced_leader: "Balanced Leader".into(),
            balanced_builder: "Balanced Builder".into(),
            early_explorer: "Early Explorer".into(),
            digitalization_led: "Digital Foundation First".into(),
            transformation_led: "Transformation Driven".into(),
            value_scaling_led: "Value Scaling Focus".into(),
        }
    }
}

impl ScenarioRules {
    /// Pick a descriptive label from the answered weighted pillars'
    /// percentages and the final score.
    pub fn label_for(
        &self,
        pillar_percentages: &[(Pillar, Percentage)],
        final_score: u32,
        thresholds: &MaturityThresholds,
    ) -> String {
        let Some(&(first_pillar, first_pct)) = pillar_percentages.first() else {
            return self.not_assessed.clone();
        };

        let (mut strongest, mut max) = (first_pillar, first_pct);
        let mut min = first_pct;
        for &(pillar, pct) in &pillar_percentages[1..] {
            if pct > max {
                strongest = pillar;
                max = pct;
            }
            if pct < min {
                min = pct;
            }
        }

        if max - min <= self.balanced_spread {
            return if final_score >= thresholds.established {
                self.balanced_leader.clone()
            } else if final_score >= thresholds.emerging {
                self.balanced_builder.clone()
            } else {
                self.early_explorer.clone()
            };
        }

        match strongest {
            Pillar::Digitalization => self.digitalization_led.clone(),
            Pillar::Transformation => self.transformation_led.clone(),
            Pillar::ValueScaling => self.value_scaling_led.clone(),
            Pillar::Unknown => self.not_assessed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = ScoringPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.pillar_weights.sum(), dec!(1.00));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut policy = ScoringPolicy::default();
        policy.pillar_weights.value_scaling = dec!(0.40);
        let err = policy.validate().unwrap_err();
        assert!(matches!(err, ReadinessError::InvalidPolicy(_)));
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = PillarWeights {
            digitalization: dec!(1.2),
            transformation: dec!(-0.2),
            value_scaling: dec!(0),
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_thresholds_must_descend() {
        let mut policy = ScoringPolicy::default();
        policy.thresholds.established = 90;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let policy = ScoringPolicy::from_json_str(
            r#"{"pillar_weights": {"digitalization": "0.5", "transformation": "0.25", "value_scaling": "0.25"}}"#,
        )
        .unwrap();
        assert_eq!(policy.pillar_weights.digitalization, dec!(0.5));
        assert_eq!(policy.thresholds, MaturityThresholds::default());
        assert_eq!(policy.tier2_max_points, dec!(5));
    }

    #[test]
    fn test_malformed_json_is_recoverable() {
        let err = ScoringPolicy::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ReadinessError::SerializationError(_)));
    }

    #[test]
    fn test_unknown_pillar_has_no_weight() {
        assert_eq!(PillarWeights::default().weight_for(Pillar::Unknown), dec!(0));
    }

    #[test]
    fn test_score_shift_default_is_identity() {
        let shift = ScoreShift::default();
        assert_eq!(shift.adjust(0), 0);
        assert_eq!(shift.adjust(63), 63);
        assert_eq!(shift.adjust(100), 100);
    }

    #[test]
    fn test_score_shift_clamps() {
        let shift = ScoreShift {
            multiplier: dec!(0.9),
            offset: dec!(15),
        };
        assert_eq!(shift.adjust(0), 15);
        // 50 * 0.9 + 15 = 60
        assert_eq!(shift.adjust(50), 60);
        // 100 * 0.9 + 15 = 105 -> 100
        assert_eq!(shift.adjust(100), 100);
    }

    #[test]
    fn test_closure_adjustment() {
        let plus_ten = |n: u32| n + 10;
        assert_eq!(plus_ten.adjust(40), 50);
        assert_eq!(plus_ten.adjust(95), 100);
    }

    #[test]
    fn test_scenario_lookup() {
        let rules = ScenarioRules::default();
        let t = MaturityThresholds::default();

        assert_eq!(rules.label_for(&[], 0, &t), "Not Assessed");

        let balanced = [
            (Pillar::Digitalization, dec!(80)),
            (Pillar::Transformation, dec!(75)),
            (Pillar::ValueScaling, dec!(70)),
        ];
        assert_eq!(rules.label_for(&balanced, 76, &t), "Balanced Leader");
        assert_eq!(rules.label_for(&balanced, 55, &t), "Balanced Builder");
        assert_eq!(rules.label_for(&balanced, 30, &t), "Early Explorer");

        let skewed = [
            (Pillar::Digitalization, dec!(40)),
            (Pillar::Transformation, dec!(90)),
            (Pillar::ValueScaling, dec!(45)),
        ];
        assert_eq!(rules.label_for(&skewed, 58, &t), "Transformation Driven");
    }

    #[test]
    fn test_scenario_ties_resolve_in_declaration_order() {
        let rules = ScenarioRules::default();
        let t = MaturityThresholds::default();
        let tied = [
            (Pillar::Digitalization, dec!(90)),
            (Pillar::Transformation, dec!(10)),
            (Pillar::ValueScaling, dec!(90)),
        ];
        assert_eq!(rules.label_for(&tied, 63, &t), "Digital Foundation First");
    }
}
