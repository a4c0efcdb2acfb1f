use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::catalog::QuestionCatalog;
use crate::policy::ScoringPolicy;
use crate::stored::StoredAssessment;
use crate::tier2::backfill::{backfill_dimension_scores_with_policy, needs_backfill};
use crate::tier2::scoring::{score_tier2, Tier2ScoreResult};
use crate::types::{round_reporting, with_metadata, ComputationOutput, Percentage, Pillar, Points};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarAverage {
    pub raw_score: Points,
    /// 0-100
    pub percentage: Percentage,
    /// Assessments that answered this pillar.
    pub assessment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAverage {
    pub score: Points,
    /// 0-100
    pub percentage: Percentage,
    pub assessment_count: usize,
}

/// Means of the four Tier-2 calculation stages, two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAverages {
    pub raw_score: Decimal,
    pub weighted_score: Decimal,
    pub normalized_score: Decimal,
    pub normalized_shifted_score: Decimal,
}

/// Company-wide means, in the same units as a single [`Tier2ScoreResult`]
/// and rounded to two decimal places like its percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAverages {
    pub assessment_count: usize,
    /// Mean displayed score, 0-100.
    pub overall_score: Decimal,
    pub pillars: BTreeMap<Pillar, PillarAverage>,
    /// Grouped by pillar like [`Tier2ScoreResult::dimension_scores`].
    pub dimensions: BTreeMap<Pillar, BTreeMap<String, DimensionAverage>>,
    pub stages: StageAverages,
}

impl TeamAverages {
    pub fn dimension(&self, pillar: Pillar, name: &str) -> Option<&DimensionAverage> {
        self.dimensions.get(&pillar)?.get(name)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Average a company's completed Tier-2 assessments under the reference
/// policy.
///
/// Stored results missing dimension detail are backfilled from their raw
/// responses first; assessments with only raw responses are scored. Each
/// assessment counts once. The result is `None` when nothing carries a
/// usable score.
pub fn compute_team_averages(
    assessments: &[StoredAssessment],
    catalog: &QuestionCatalog,
) -> ComputationOutput<Option<TeamAverages>> {
    compute_team_averages_with_policy(assessments, catalog, &ScoringPolicy::default())
}

pub fn compute_team_averages_with_policy(
    assessments: &[StoredAssessment],
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ComputationOutput<Option<TeamAverages>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let results: Vec<Tier2ScoreResult> = assessments
        .iter()
        .filter_map(|a| resolve_score(a, catalog, policy, &mut warnings))
        .collect();
    let averages = average_results(&results);

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "mean": "arithmetic, one vote per assessment",
        "pillar_and_dimension_means": "over assessments containing the pillar or dimension",
        "assessments_supplied": assessments.len(),
        "assessments_used": results.len(),
    });

    with_metadata(
        "Team arithmetic mean of Tier-2 results",
        &assumptions,
        warnings,
        elapsed,
        averages,
    )
}

/// The full Tier-2 result an assessment contributes, backfilled when needed.
pub fn resolve_score(
    assessment: &StoredAssessment,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
    warnings: &mut Vec<String>,
) -> Option<Tier2ScoreResult> {
    let id = &assessment.assessment_id;
    match (&assessment.score, &assessment.responses) {
        (Some(score), Some(responses)) if needs_backfill(score) => Some(
            backfill_dimension_scores_with_policy(score, responses, catalog, policy, warnings),
        ),
        (Some(score), None) if needs_backfill(score) => {
            warnings.push(format!(
                "Assessment '{}' has no dimension detail and no raw responses to rebuild it.",
                id
            ));
            Some(score.clone())
        }
        (Some(score), _) => Some(score.clone()),
        (None, Some(responses)) if !responses.is_empty() => Some(score_tier2(
            responses,
            catalog,
            policy,
            &policy.adjustment,
            warnings,
        )),
        (None, _) => {
            tracing::warn!(assessment_id = %id, "assessment carries no usable score");
            warnings.push(format!("Assessment '{}' carries no usable score, skipped.", id));
            None
        }
    }
}

/// Arithmetic means over already-resolved results. `None` when empty.
pub fn average_results(results: &[Tier2ScoreResult]) -> Option<TeamAverages> {
    if results.is_empty() {
        return None;
    }
    let n = Decimal::from(results.len());
    let mean_of = |f: fn(&Tier2ScoreResult) -> Decimal| -> Decimal {
        round_reporting(results.iter().map(f).sum::<Decimal>() / n)
    };

    let stages = StageAverages {
        raw_score: mean_of(|r| r.total_raw_score),
        weighted_score: mean_of(|r| r.weighted_score),
        normalized_score: mean_of(|r| Decimal::from(r.normalized_score)),
        normalized_shifted_score: mean_of(|r| Decimal::from(r.normalized_shifted_score)),
    };

    let mut pillar_sums: BTreeMap<Pillar, (Decimal, Decimal, usize)> = BTreeMap::new();
    let mut dimension_sums: BTreeMap<(Pillar, String), (Decimal, Decimal, usize)> = BTreeMap::new();
    for result in results {
        for (pillar, score) in &result.pillar_scores {
            let entry = pillar_sums
                .entry(*pillar)
                .or_insert((Decimal::ZERO, Decimal::ZERO, 0));
            entry.0 += score.raw_score;
            entry.1 += score.percentage;
            entry.2 += 1;
        }
        for (pillar, name, score) in result.dimensions() {
            let entry = dimension_sums
                .entry((pillar, name.to_string()))
                .or_insert((Decimal::ZERO, Decimal::ZERO, 0));
            entry.0 += score.raw_score;
            entry.1 += score.percentage;
            entry.2 += 1;
        }
    }

    let pillars = pillar_sums
        .into_iter()
        .map(|(pillar, (raw, pct, count))| {
            let c = Decimal::from(count);
            (
                pillar,
                PillarAverage {
                    raw_score: round_reporting(raw / c),
                    percentage: round_reporting(pct / c),
                    assessment_count: count,
                },
            )
        })
        .collect();

    let mut dimensions: BTreeMap<Pillar, BTreeMap<String, DimensionAverage>> = BTreeMap::new();
    for ((pillar, name), (raw, pct, count)) in dimension_sums {
        let c = Decimal::from(count);
        dimensions.entry(pillar).or_default().insert(
            name,
            DimensionAverage {
                score: round_reporting(raw / c),
                percentage: round_reporting(pct / c),
                assessment_count: count,
            },
        );
    }

    tracing::debug!(assessments = results.len(), "team averages computed");

    Some(TeamAverages {
        assessment_count: results.len(),
        overall_score: stages.normalized_shifted_score,
        pillars,
        dimensions,
        stages,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
