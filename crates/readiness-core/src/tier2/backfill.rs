//! Reconstruct dimension-level detail for stored Tier-2 results written
//! before that detail was persisted.
//!
//! Only missing pieces are filled; the stored summary figures (raw,
//! weighted, normalized and displayed scores, maturity level) are what the
//! respondent saw and stay untouched. Running a backfill on its own output
//! changes nothing.

use std::time::Instant;

use crate::catalog::QuestionCatalog;
use crate::policy::ScoringPolicy;
use crate::tier2::scoring::{Tally, Tier2ScoreResult};
use crate::types::{with_metadata, ComputationOutput, Percentage, Pillar, Responses};

/// True when a stored result lacks dimension scores.
pub fn needs_backfill(result: &Tier2ScoreResult) -> bool {
    result.dimension_scores.is_empty()
}

/// Fill missing dimension (and pillar) detail of `result` from the raw
/// responses it was computed from, under the reference policy.
pub fn backfill_dimension_scores(
    result: &Tier2ScoreResult,
    responses: &Responses,
    catalog: &QuestionCatalog,
) -> Tier2ScoreResult {
    let mut warnings = Vec::new();
    backfill_dimension_scores_with_policy(
        result,
        responses,
        catalog,
        &ScoringPolicy::default(),
        &mut warnings,
    )
}

/// Backfill under `policy`, wrapped in the standard output envelope with the
/// warnings raised while re-reading the responses.
pub fn backfill_tier2_detail(
    result: &Tier2ScoreResult,
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ComputationOutput<Tier2ScoreResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let filled =
        backfill_dimension_scores_with_policy(result, responses, catalog, policy, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "kept": "stored summary figures",
        "filled": "missing pillar and dimension detail",
    });
    with_metadata(
        "Tier-2 dimension backfill",
        &assumptions,
        warnings,
        elapsed,
        filled,
    )
}

pub fn backfill_dimension_scores_with_policy(
    result: &Tier2ScoreResult,
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
    warnings: &mut Vec<String>,
) -> Tier2ScoreResult {
    let mut filled = result.clone();
    let missing_dimensions = filled.dimension_scores.is_empty();
    let missing_pillars = filled.pillar_scores.is_empty();
    if !missing_dimensions && !missing_pillars && !filled.scenario.is_empty() {
        return filled;
    }

    let tally = Tally::collect(responses, catalog, policy, warnings);
    if missing_dimensions {
        filled.dimension_scores = tally.dimension_scores(policy);
    }
    if missing_pillars {
        filled.pillar_scores = tally.pillar_scores(policy);
    }
    if filled.scenario.is_empty() && !filled.pillar_scores.is_empty() {
        let answered: Vec<(Pillar, Percentage)> = Pillar::WEIGHTED
            .iter()
            .filter_map(|p| filled.pillar_scores.get(p).map(|s| (*p, s.percentage)))
            .collect();
        filled.scenario = policy.scenario.label_for(
            &answered,
            filled.normalized_shifted_score,
            &policy.thresholds,
        );
    }

    tracing::debug!(
        dimensions = filled.dimensions().count(),
        pillars = filled.pillar_scores.len(),
        "backfilled tier-2 detail"
    );
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Question, QuestionKind, QuestionMetadata, QuestionOption};
    use crate::maturity::MaturityLevel;
    use crate::tier2::scoring::calculate_tier2_score;
    use crate::types::tag_responses;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn question(id: &str, pillar: &str, dimension: &str) -> Question {
        Question {
            id: id.into(),
            prompt: String::new(),
            section_id: None,
            metadata: QuestionMetadata {
                pillar: Some(pillar.into()),
                dimension: Some(dimension.into()),
            },
            order: 0,
            kind: QuestionKind::SingleChoice,
            required: false,
            options: ["BASIC", "EMERGING", "ESTABLISHED", "WORLD_CLASS"]
                .iter()
                .zip([1, 2, 4, 5])
                .map(|(value, score)| QuestionOption {
                    id: format!("{id}-{value}"),
                    question_id: id.into(),
                    label: value.to_string(),
                    value: value.to_string(),
                    score: Decimal::from(score),
                })
                .collect(),
        }
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::new(vec![
            question("d1", "DIGITALIZATION", "Data"),
            question("t1", "TRANSFORMATION", "Culture"),
            question("v1", "VALUE_SCALING", "Revenue"),
        ])
    }

    fn legacy_summary() -> Tier2ScoreResult {
        Tier2ScoreResult {
            pillar_scores: BTreeMap::new(),
            dimension_scores: BTreeMap::new(),
            total_raw_score: dec!(11),
            weighted_score: dec!(72),
            normalized_score: 72,
            normalized_shifted_score: 75,
            maturity_level: MaturityLevel::Established,
            scenario: String::new(),
        }
    }

    fn responses() -> Responses {
        tag_responses([("d1", "WORLD_CLASS"), ("t1", "EMERGING"), ("v1", "ESTABLISHED")])
    }

    #[test]
    fn test_backfill_fills_dimension_detail() {
        let legacy = legacy_summary();
        assert!(needs_backfill(&legacy));

        let filled = backfill_dimension_scores(&legacy, &responses(), &catalog());
        assert!(!needs_backfill(&filled));
        assert_eq!(filled.dimensions().count(), 3);
        let data = filled.dimension(Pillar::Digitalization, "Data").unwrap();
        assert_eq!(data.percentage, dec!(100));
        let culture = filled.dimension(Pillar::Transformation, "Culture").unwrap();
        assert_eq!(culture.percentage, dec!(40));
        assert_eq!(filled.pillar_scores[&Pillar::ValueScaling].raw_score, dec!(4));
        assert!(!filled.scenario.is_empty());
    }

    #[test]
    fn test_backfill_keeps_stored_summary() {
        let legacy = legacy_summary();
        let filled = backfill_dimension_scores(&legacy, &responses(), &catalog());
        assert_eq!(filled.total_raw_score, legacy.total_raw_score);
        assert_eq!(filled.weighted_score, legacy.weighted_score);
        assert_eq!(filled.normalized_score, legacy.normalized_score);
        assert_eq!(filled.normalized_shifted_score, legacy.normalized_shifted_score);
        assert_eq!(filled.maturity_level, legacy.maturity_level);
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let once = backfill_dimension_scores(&legacy_summary(), &responses(), &catalog());
        let twice = backfill_dimension_scores(&once, &responses(), &catalog());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_backfill_without_responses_is_idempotent() {
        let once = backfill_dimension_scores(&legacy_summary(), &Responses::new(), &catalog());
        assert!(once.dimension_scores.is_empty());
        let twice = backfill_dimension_scores(&once, &Responses::new(), &catalog());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_complete_result_untouched() {
        let full = calculate_tier2_score(&responses(), &catalog()).result;
        let filled = backfill_dimension_scores(&full, &Responses::new(), &catalog());
        assert_eq!(filled, full);
    }

    #[test]
    fn test_enveloped_backfill_reports_warnings() {
        let mut answers = responses();
        answers.insert("ghost".into(), crate::types::ResponseValue::choice("BASIC"));
        let out = backfill_tier2_detail(
            &legacy_summary(),
            &answers,
            &catalog(),
            &ScoringPolicy::default(),
        );
        assert_eq!(out.methodology, "Tier-2 dimension backfill");
        assert_eq!(out.result.dimensions().count(), 3);
        assert_eq!(out.result.normalized_shifted_score, 75);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("'ghost'"));
    }

    #[test]
    fn test_backfill_matches_fresh_detail() {
        let fresh = calculate_tier2_score(&responses(), &catalog()).result;
        let filled = backfill_dimension_scores(&legacy_summary(), &responses(), &catalog());
        assert_eq!(filled.dimension_scores, fresh.dimension_scores);
        assert_eq!(filled.pillar_scores, fresh.pillar_scores);
    }
}
