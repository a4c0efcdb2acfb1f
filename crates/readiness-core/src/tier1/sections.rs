//! Per-section Tier-1 scores, using each selected option's own point value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::catalog::{QuestionCatalog, UNKNOWN_DIMENSION};
use crate::maturity::MaturityLevel;
use crate::policy::ScoringPolicy;
use crate::types::{to_whole_score, with_metadata, ComputationOutput, Points, ResponseValue, Responses};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    /// 0-100
    pub score: u32,
    pub answered: usize,
    pub maturity_level: MaturityLevel,
}

/// Mean points per catalog section. A question's section is its
/// `section_id`, falling back to its dimension.
///
/// Responses for questions missing from the catalog are excluded and
/// reported as warnings.
pub fn calculate_tier1_section_scores(
    responses: &Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ComputationOutput<BTreeMap<String, SectionScore>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut totals: BTreeMap<String, (Points, usize)> = BTreeMap::new();

    for (question_id, value) in responses {
        let Some(question) = catalog.get(question_id) else {
            tracing::warn!(%question_id, "response references a question missing from the catalog");
            warnings.push(format!(
                "Question '{}' is not in the catalog, response excluded.",
                question_id
            ));
            continue;
        };
        let ResponseValue::Choice(tag) = value else {
            warnings.push(format!(
                "Question '{}': expected a maturity tag, response skipped.",
                question_id
            ));
            continue;
        };

        let points = match question.option_for(tag) {
            Some(option) => option.score,
            None => MaturityLevel::from_tag(tag)
                .map(|level| policy.tier1_points.for_level(level))
                .unwrap_or(Decimal::ZERO),
        };

        let section = question
            .section_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| question.dimension())
            .to_string();
        let entry = totals.entry(section).or_insert((Decimal::ZERO, 0));
        entry.0 += points;
        entry.1 += 1;
    }

    let sections = totals
        .into_iter()
        .map(|(section, (points, answered))| {
            let score = to_whole_score(points / Decimal::from(answered));
            (
                section,
                SectionScore {
                    score,
                    answered,
                    maturity_level: policy.classify(score),
                },
            )
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "section_key": "section_id, else dimension, else \"Unknown\"",
        "unknown_section": UNKNOWN_DIMENSION,
    });

    with_metadata(
        "Tier-1 mean option points per section",
        &assumptions,
        warnings,
        elapsed,
        sections,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Question, QuestionKind, QuestionMetadata, QuestionOption};
    use crate::types::tag_responses;
    use rust_decimal_macros::dec;

    fn question(id: &str, section: Option<&str>, dimension: Option<&str>) -> Question {
        let opt = |value: &str, score: Decimal| QuestionOption {
            id: format!("{id}-{value}"),
            question_id: id.into(),
            label: value.into(),
            value: value.into(),
            score,
        };
        Question {
            id: id.into(),
            prompt: String::new(),
            section_id: section.map(Into::into),
            metadata: QuestionMetadata {
                pillar: None,
                dimension: dimension.map(Into::into),
            },
            order: 0,
            kind: QuestionKind::SingleChoice,
            required: true,
            options: vec![
                opt("BASIC", dec!(25)),
                opt("EMERGING", dec!(50)),
                opt("ESTABLISHED", dec!(75)),
                opt("WORLD_CLASS", dec!(100)),
            ],
        }
    }

    #[test]
    fn test_sections_average_independently() {
        let catalog = QuestionCatalog::new(vec![
            question("q1", Some("strategy"), None),
            question("q2", Some("strategy"), None),
            question("q3", None, Some("Data")),
            question("q4", None, None),
        ]);
        let responses = tag_responses([
            ("q1", "WORLD_CLASS"),
            ("q2", "ESTABLISHED"),
            ("q3", "BASIC"),
            ("q4", "EMERGING"),
        ]);
        let out = calculate_tier1_section_scores(&responses, &catalog, &ScoringPolicy::default());
        let s = &out.result;

        // (100 + 75) / 2 = 87.5 -> 88
        assert_eq!(s["strategy"].score, 88);
        assert_eq!(s["strategy"].answered, 2);
        assert_eq!(s["strategy"].maturity_level, MaturityLevel::WorldClass);
        assert_eq!(s["Data"].score, 25);
        assert_eq!(s[UNKNOWN_DIMENSION].score, 50);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_option_score_overrides_default_points() {
        let mut q = question("q1", Some("ops"), None);
        q.options[1].score = dec!(60);
        let catalog = QuestionCatalog::new(vec![q]);
        let responses = tag_responses([("q1", "EMERGING")]);
        let out = calculate_tier1_section_scores(&responses, &catalog, &ScoringPolicy::default());
        assert_eq!(out.result["ops"].score, 60);
    }

    #[test]
    fn test_unknown_question_is_excluded() {
        let catalog = QuestionCatalog::new(vec![question("q1", Some("ops"), None)]);
        let responses = tag_responses([("q1", "BASIC"), ("ghost", "WORLD_CLASS")]);
        let out = calculate_tier1_section_scores(&responses, &catalog, &ScoringPolicy::default());
        assert_eq!(out.result.len(), 1);
        assert_eq!(out.result["ops"].score, 25);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("ghost"));
    }
}
