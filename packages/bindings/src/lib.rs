use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use readiness_core::policy::ScoringPolicy;
use readiness_core::stored::{
    parse_response_blob, parse_score_blob, parse_stored_assessments, StoredAssessment,
};
use readiness_core::team::averages::{compute_team_averages_with_policy, TeamAverages};
use readiness_core::team::gap::compare_to_team;
use readiness_core::tier1::scoring::calculate_tier1_score_with_policy;
use readiness_core::tier2::backfill::backfill_tier2_detail;
use readiness_core::tier2::scoring::{calculate_tier2_score_with_policy, Tier2ScoreResult};
use readiness_core::{Question, QuestionCatalog, Responses};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Reference policy unless the caller passes one as JSON.
fn resolve_policy(policy_json: Option<String>) -> NapiResult<ScoringPolicy> {
    match policy_json {
        Some(json) => ScoringPolicy::from_json_str(&json).map_err(to_napi_error),
        None => Ok(ScoringPolicy::default()),
    }
}

fn parse_catalog(questions_json: &str) -> NapiResult<QuestionCatalog> {
    let questions: Vec<Question> = serde_json::from_str(questions_json).map_err(to_napi_error)?;
    Ok(QuestionCatalog::new(questions))
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tier1_score(
    responses_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let responses: Responses = serde_json::from_str(&responses_json).map_err(to_napi_error)?;
    let policy = resolve_policy(policy_json)?;
    let output = calculate_tier1_score_with_policy(&responses, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_tier2_score(
    responses_json: String,
    questions_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let responses: Responses = serde_json::from_str(&responses_json).map_err(to_napi_error)?;
    let catalog = parse_catalog(&questions_json)?;
    let policy = resolve_policy(policy_json)?;
    let output = calculate_tier2_score_with_policy(&responses, &catalog, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Rebuild missing dimension detail of a stored Tier-2 result from its raw
/// responses. Stored summary figures are returned unchanged.
#[napi]
pub fn backfill_dimension_scores(
    score_json: String,
    responses_json: String,
    questions_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let stored = parse_score_blob(&score_json).map_err(to_napi_error)?;
    let responses = parse_response_blob(&responses_json).map_err(to_napi_error)?;
    let catalog = parse_catalog(&questions_json)?;
    let policy = resolve_policy(policy_json)?;
    let output = backfill_tier2_detail(&stored, &responses, &catalog, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// `assessments_json` is an array of stored assessment records; unreadable
/// records are skipped and reported in `warnings`.
#[napi]
pub fn compute_team_averages(
    assessments_json: String,
    questions_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&assessments_json).map_err(to_napi_error)?;
    let (assessments, parse_warnings): (Vec<StoredAssessment>, Vec<String>) =
        parse_stored_assessments(records);
    let catalog = parse_catalog(&questions_json)?;
    let policy = resolve_policy(policy_json)?;

    let mut output = compute_team_averages_with_policy(&assessments, &catalog, &policy);
    let mut warnings = parse_warnings;
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct CompareInput {
    individual: Tier2ScoreResult,
    team: TeamAverages,
}

#[napi]
pub fn compare_to_team_averages(input_json: String) -> NapiResult<String> {
    let input: CompareInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let comparison = compare_to_team(&input.individual, &input.team);
    serde_json::to_string(&comparison).map_err(to_napi_error)
}
