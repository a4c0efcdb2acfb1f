use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::maturity::{MaturityBreakdown, MaturityLevel};
use crate::policy::ScoringPolicy;
use crate::types::{to_whole_score, with_metadata, ComputationOutput, ResponseValue, Responses};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier1ScoreResult {
    /// 0-100
    pub overall_score: u32,
    pub total_questions: usize,
    pub breakdown: MaturityBreakdown,
    pub maturity_level: MaturityLevel,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a flat set of single-choice Tier-1 responses under the reference
/// policy.
///
/// Each answer's maturity tag maps to its point value; the overall score is
/// the mean rounded half-up. An empty set yields the zero state with a
/// `Basic` label. Never fails.
pub fn calculate_tier1_score(responses: &Responses) -> ComputationOutput<Tier1ScoreResult> {
    calculate_tier1_score_with_policy(responses, &ScoringPolicy::default())
}

pub fn calculate_tier1_score_with_policy(
    responses: &Responses,
    policy: &ScoringPolicy,
) -> ComputationOutput<Tier1ScoreResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = score_tier1(responses, policy, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "points": policy.tier1_points,
        "thresholds": policy.thresholds,
        "rounding": "half_up",
        "unrecognized_tags": "score 0, counted in denominator",
    });

    with_metadata(
        "Tier-1 mean maturity points",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

/// The Tier-1 computation without the envelope.
pub fn score_tier1(
    responses: &Responses,
    policy: &ScoringPolicy,
    warnings: &mut Vec<String>,
) -> Tier1ScoreResult {
    let mut breakdown = MaturityBreakdown::default();
    let mut total_points = Decimal::ZERO;

    for (question_id, value) in responses {
        let tag = match value {
            ResponseValue::Choice(tag) => tag,
            other => {
                tracing::warn!(%question_id, ?other, "skipping non-tag Tier-1 response");
                warnings.push(format!(
                    "Question '{}': expected a maturity tag, response skipped.",
                    question_id
                ));
                continue;
            }
        };

        let level = MaturityLevel::from_tag(tag);
        match level {
            Some(level) => total_points += policy.tier1_points.for_level(level),
            None => {
                tracing::warn!(%question_id, %tag, "unrecognized maturity tag scores zero");
                warnings.push(format!(
                    "Question '{}': unrecognized maturity tag '{}' scored as 0.",
                    question_id, tag
                ));
            }
        }
        breakdown.record(level);
    }

    let total_questions = breakdown.total();
    if total_questions == 0 {
        return Tier1ScoreResult::default();
    }

    let overall_score = to_whole_score(total_points / Decimal::from(total_questions));
    tracing::debug!(%total_points, total_questions, overall_score, "tier-1 scored");

    Tier1ScoreResult {
        overall_score,
        total_questions,
        breakdown,
        maturity_level: policy.classify(overall_score),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
