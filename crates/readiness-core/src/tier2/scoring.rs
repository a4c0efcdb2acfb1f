use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::catalog::QuestionCatalog;
use crate::maturity::MaturityLevel;
use crate::policy::{ScoreAdjustment, ScoringPolicy};
use crate::types::{
    percentage_of, round_reporting, to_whole_score, with_metadata, ComputationOutput, Percentage, Pillar, Points,
    ResponseValue, Responses, Weight,
};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub raw_score: Points,
    /// Max points over the questions actually answered in this pillar.
    pub max_raw_score: Points,
    pub answered_questions: usize,
    pub dimension_count: usize,
    /// 0-100
    pub percentage: Percentage,
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub raw_score: Points,
    pub max_raw_score: Points,
    pub answered_questions: usize,
    /// 0-100
    pub percentage: Percentage,
}

/// Dimension scores grouped by pillar. A dimension name is only unique
/// within its pillar.
pub type DimensionScores = BTreeMap<Pillar, BTreeMap<String, DimensionScore>>;

/// Full Tier-2 result. Stored results written before dimension detail
/// existed deserialize with empty `pillar_scores`/`dimension_scores`; see
/// [`crate::tier2::backfill`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier2ScoreResult {
    #[serde(default)]
    pub pillar_scores: BTreeMap<Pillar, PillarScore>,
    #[serde(default)]
    pub dimension_scores: DimensionScores,
    pub total_raw_score: Points,
    /// Sum of pillar percentage x pillar weight, two decimal places.
    pub weighted_score: Decimal,
    /// 0-100
    pub normalized_score: u32,
    /// 0-100, the score shown to end users.
    pub normalized_shifted_score: u32,
    pub maturity_level: MaturityLevel,
    #[serde(default)]
    pub scenario: String,
}

impl Tier2ScoreResult {
    pub fn dimension(&self, pillar: Pillar, name: &str) -> Option<&DimensionScore> {
        self.dimension_scores.get(&pillar)?.get(name)
    }

    /// Every dimension score with its pillar, pillar by pillar.
    pub fn dimensions(&self) -> impl Iterator<Item = (Pillar, &str, &DimensionScore)> + '_ {
        self.dimension_scores.iter().flat_map(|(&pillar, dims)| {
            dims.iter()
                .map(move |(name, score)| (pillar, name.as_str(), score))
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a Tier-2 response set against the question catalog under the
/// reference policy.
pub fn calculate_tier2_score(
    responses: &Responses,
    catalog: &QuestionCatalog,
) -> ComputationOutput<Tier2ScoreResult> {
    calculate_tier2_score_with_policy(responses, catalog, &ScoringPolicy::default())
}

pub fn calculate_tier2_score_with_policy(
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ComputationOutput<Tier2ScoreResult> {
    calculate_tier2_score_with_adjustment(responses, catalog, policy, &policy.adjustment)
}

/// As [`calculate_tier2_score_with_policy`], with the final adjustment
/// swapped for `adjustment`.
pub fn calculate_tier2_score_with_adjustment(
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
    adjustment: &dyn ScoreAdjustment,
) -> ComputationOutput<Tier2ScoreResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = score_tier2(responses, catalog, policy, adjustment, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "max_points_per_question": policy.tier2_max_points,
        "pillar_weights": policy.pillar_weights,
        "max_raw": "max points x answered questions",
        "normalization": "weighted score over weight of answered pillars",
        "thresholds": policy.thresholds,
        "catalog_questions": catalog.len(),
    });

    with_metadata(
        "Tier-2 pillar-weighted dimension scoring",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

/// The Tier-2 computation without the envelope.
pub fn score_tier2(
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
    adjustment: &dyn ScoreAdjustment,
    warnings: &mut Vec<String>,
) -> Tier2ScoreResult {
    for question in catalog.unanswered_required(|id| responses.contains_key(id)) {
        warnings.push(format!(
            "Required question '{}' unanswered, excluded from its maximum.",
            question.id
        ));
    }

    let tally = Tally::collect(responses, catalog, policy, warnings);
    let pillar_scores = tally.pillar_scores(policy);
    let dimension_scores = tally.dimension_scores(policy);

    let total_raw_score: Points = pillar_scores.values().map(|p| p.raw_score).sum();

    let mut weighted_score = Decimal::ZERO;
    let mut answered_weight = Decimal::ZERO;
    let mut answered_pillars: Vec<(Pillar, Percentage)> = Vec::new();
    for pillar in Pillar::WEIGHTED {
        let Some(score) = pillar_scores.get(&pillar) else {
            continue;
        };
        weighted_score += score.percentage * score.weight;
        answered_weight += score.weight;
        answered_pillars.push((pillar, score.percentage));
    }

    let normalized_score = if answered_weight > Decimal::ZERO {
        to_whole_score(weighted_score / answered_weight)
    } else {
        0
    };
    let weighted_score = round_reporting(weighted_score);
    let normalized_shifted_score = adjustment.adjust(normalized_score);
    let maturity_level = policy.classify(normalized_shifted_score);
    let scenario =
        policy
            .scenario
            .label_for(&answered_pillars, normalized_shifted_score, &policy.thresholds);

    tracing::debug!(
        %total_raw_score,
        %weighted_score,
        normalized_score,
        normalized_shifted_score,
        "tier-2 scored"
    );

    Tier2ScoreResult {
        pillar_scores,
        dimension_scores,
        total_raw_score,
        weighted_score,
        normalized_score,
        normalized_shifted_score,
        maturity_level,
        scenario,
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    raw: Points,
    answered: usize,
}

impl Accumulator {
    fn add(&mut self, points: Points) {
        self.raw += points;
        self.answered += 1;
    }

    fn max_raw(&self, policy: &ScoringPolicy) -> Points {
        policy.tier2_max_points * Decimal::from(self.answered)
    }
}

/// Points per pillar and per dimension for the valid responses of a set.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pillars: BTreeMap<Pillar, Accumulator>,
    dimensions: BTreeMap<Pillar, BTreeMap<String, Accumulator>>,
}

impl Tally {
    pub(crate) fn collect(
        responses: &Responses,
        catalog: &QuestionCatalog,
        policy: &ScoringPolicy,
        warnings: &mut Vec<String>,
    ) -> Self {
        let mut tally = Tally::default();

        for (question_id, value) in responses {
            let Some(question) = catalog.get(question_id) else {
                tracing::warn!(%question_id, "response references a question missing from the catalog");
                warnings.push(format!(
                    "Question '{}' is not in the catalog, response excluded.",
                    question_id
                ));
                continue;
            };
            if !question.is_scored() {
                continue;
            }

            let points = match value {
                ResponseValue::Points(points) => Decimal::from(*points),
                ResponseValue::Choice(selected) => match question.option_for(selected) {
                    Some(option) => option.score,
                    None => {
                        tracing::warn!(%question_id, %selected, "no option matches response");
                        warnings.push(format!(
                            "Question '{}': no option matches '{}', response skipped.",
                            question_id, selected
                        ));
                        continue;
                    }
                },
                ResponseValue::Malformed(raw) => {
                    tracing::warn!(%question_id, %raw, "malformed response");
                    warnings.push(format!(
                        "Question '{}': malformed response {}, skipped.",
                        question_id, raw
                    ));
                    continue;
                }
            };

            if points < Decimal::ZERO || points > policy.tier2_max_points {
                tracing::warn!(%question_id, %points, "response points outside scale");
                warnings.push(format!(
                    "Question '{}': {} points is outside 0-{}, response skipped.",
                    question_id, points, policy.tier2_max_points
                ));
                continue;
            }

            let pillar = question.pillar();
            let dimension = question.dimension();
            tally.pillars.entry(pillar).or_default().add(points);
            tally
                .dimensions
                .entry(pillar)
                .or_default()
                .entry(dimension.to_string())
                .or_default()
                .add(points);
        }

        tally
    }

    pub(crate) fn pillar_scores(&self, policy: &ScoringPolicy) -> BTreeMap<Pillar, PillarScore> {
        self.pillars
            .iter()
            .map(|(&pillar, acc)| {
                let max_raw_score = acc.max_raw(policy);
                let score = PillarScore {
                    raw_score: acc.raw,
                    max_raw_score,
                    answered_questions: acc.answered,
                    dimension_count: self.dimensions.get(&pillar).map_or(0, BTreeMap::len),
                    percentage: percentage_of(acc.raw, max_raw_score),
                    weight: policy.pillar_weights.weight_for(pillar),
                };
                (pillar, score)
            })
            .collect()
    }

    pub(crate) fn dimension_scores(&self, policy: &ScoringPolicy) -> DimensionScores {
        self.dimensions
            .iter()
            .map(|(&pillar, dims)| {
                let scores = dims
                    .iter()
                    .map(|(name, acc)| {
                        let max_raw_score = acc.max_raw(policy);
                        let score = DimensionScore {
                            raw_score: acc.raw,
                            max_raw_score,
                            answered_questions: acc.answered,
                            percentage: percentage_of(acc.raw, max_raw_score),
                        };
                        (name.clone(), score)
                    })
                    .collect();
                (pillar, scores)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
