//! Repository-backed operations: resubmitting an assessment and building the
//! team comparison shown on a report. The repository is always injected.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::QuestionCatalog;
use crate::error::ReadinessError;
use crate::policy::ScoringPolicy;
use crate::repository::AssessmentRepository;
use crate::team::averages::{compute_team_averages_with_policy, resolve_score, TeamAverages};
use crate::team::gap::{compare_to_team, ScoreComparison};
use crate::tier2::scoring::{score_tier2, Tier2ScoreResult};
use crate::types::{with_metadata, ComputationOutput, Responses};
use crate::ReadinessResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub assessment_id: String,
    pub company_id: String,
    pub individual: Tier2ScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamAverages>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ScoreComparison>,
}

/// Replace an assessment's answers, recompute its score and save both.
pub fn resubmit_assessment(
    repo: &dyn AssessmentRepository,
    assessment_id: &str,
    responses: Responses,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ReadinessResult<ComputationOutput<Tier2ScoreResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut assessment = repo
        .get(assessment_id)?
        .ok_or_else(|| ReadinessError::NotFound {
            entity: "assessment".into(),
            id: assessment_id.into(),
        })?;

    let score = score_tier2(&responses, catalog, policy, &policy.adjustment, &mut warnings);
    assessment.score = Some(score.clone());
    assessment.responses = Some(responses);
    assessment.completed_at = Some(Utc::now());
    repo.save(assessment)?;
    tracing::info!(%assessment_id, score = score.normalized_shifted_score, "assessment rescored");

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({ "replaces": "stored score and responses" });
    Ok(with_metadata(
        "Tier-2 rescoring on resubmission",
        &assumptions,
        warnings,
        elapsed,
        score,
    ))
}

/// Load one assessment and its company's assessments, average the company
/// and compare the individual against it.
pub fn build_team_report(
    repo: &dyn AssessmentRepository,
    assessment_id: &str,
    catalog: &QuestionCatalog,
    policy: &ScoringPolicy,
) -> ReadinessResult<ComputationOutput<TeamReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assessment = repo
        .get(assessment_id)?
        .ok_or_else(|| ReadinessError::NotFound {
            entity: "assessment".into(),
            id: assessment_id.into(),
        })?;
    let individual = resolve_score(&assessment, catalog, policy, &mut warnings).ok_or_else(|| {
        ReadinessError::InvalidInput {
            field: "assessment".into(),
            reason: format!("Assessment '{}' carries no usable score.", assessment_id),
        }
    })?;

    let company = repo.list(&assessment.company_id)?;
    let averages = compute_team_averages_with_policy(&company, catalog, policy);
    warnings.extend(averages.warnings);
    let team = averages.result;
    let comparison = team.as_ref().map(|t| compare_to_team(&individual, t));

    let report = TeamReport {
        assessment_id: assessment.assessment_id,
        company_id: assessment.company_id,
        individual,
        team,
        comparison,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "team_scope": "all stored assessments of the company, including this one",
    });
    Ok(with_metadata(
        "Individual vs team gap analysis",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Question, QuestionKind, QuestionMetadata, QuestionOption};
    use crate::repository::InMemoryAssessmentRepository;
    use crate::stored::StoredAssessment;
    use crate::types::{tag_responses, Pillar};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn catalog() -> QuestionCatalog {
        let q = |id: &str, pillar: &str, dim: &str| Question {
            id: id.into(),
            prompt: String::new(),
            section_id: None,
            metadata: QuestionMetadata {
                pillar: Some(pillar.into()),
                dimension: Some(dim.into()),
            },
            order: 0,
            kind: QuestionKind::SingleChoice,
            required: true,
            options: [("BASIC", 1), ("EMERGING", 2), ("ESTABLISHED", 4), ("WORLD_CLASS", 5)]
                .into_iter()
                .map(|(value, score)| QuestionOption {
                    id: format!("{id}-{value}"),
                    question_id: id.into(),
                    label: value.into(),
                    value: value.into(),
                    score: Decimal::from(score),
                })
                .collect(),
        };
        QuestionCatalog::new(vec![
            q("d1", "DIGITALIZATION", "Data"),
            q("t1", "TRANSFORMATION", "Culture"),
        ])
    }

    fn stored(id: &str, responses: Responses) -> StoredAssessment {
        StoredAssessment {
            assessment_id: id.into(),
            company_id: "acme".into(),
            respondent: None,
            completed_at: None,
            score: None,
            responses: Some(responses),
        }
    }

    #[test]
    fn test_resubmit_replaces_score() {
        let repo = InMemoryAssessmentRepository::with_assessments([stored(
            "a1",
            tag_responses([("d1", "BASIC"), ("t1", "BASIC")]),
        )]);
        let out = resubmit_assessment(
            &repo,
            "a1",
            tag_responses([("d1", "WORLD_CLASS"), ("t1", "WORLD_CLASS")]),
            &catalog(),
            &ScoringPolicy::default(),
        )
        .unwrap();
        assert_eq!(out.result.normalized_shifted_score, 100);

        let saved = repo.get("a1").unwrap().unwrap();
        assert_eq!(saved.score.unwrap().normalized_shifted_score, 100);
        assert!(saved.completed_at.is_some());
    }

    #[test]
    fn test_resubmit_unknown_assessment() {
        let repo = InMemoryAssessmentRepository::new();
        let err = resubmit_assessment(
            &repo,
            "nope",
            Responses::new(),
            &catalog(),
            &ScoringPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReadinessError::NotFound { .. }));
    }

    #[test]
    fn test_team_report() {
        let repo = InMemoryAssessmentRepository::with_assessments([
            stored("a1", tag_responses([("d1", "WORLD_CLASS"), ("t1", "ESTABLISHED")])),
            stored("a2", tag_responses([("d1", "BASIC"), ("t1", "EMERGING")])),
        ]);
        let out = build_team_report(&repo, "a1", &catalog(), &ScoringPolicy::default()).unwrap();
        let report = out.result;

        let team = report.team.unwrap();
        assert_eq!(team.assessment_count, 2);
        // Data: 100% and 20% -> 60%
        let data = team.dimension(Pillar::Digitalization, "Data").unwrap();
        assert_eq!(data.percentage, dec!(60));

        let cmp = report.comparison.unwrap();
        let gap = cmp.dimension(Pillar::Digitalization, "Data").unwrap();
        assert_eq!(gap.delta, dec!(40));
    }

    #[test]
    fn test_team_report_without_usable_score() {
        let mut bare = stored("a1", Responses::new());
        bare.responses = None;
        let repo = InMemoryAssessmentRepository::with_assessments([bare]);
        let err = build_team_report(&repo, "a1", &catalog(), &ScoringPolicy::default())
            .unwrap_err();
        assert!(matches!(err, ReadinessError::InvalidInput { .. }));
    }
}
