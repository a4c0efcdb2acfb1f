use readiness_core::maturity::MaturityLevel;
use readiness_core::policy::ScoringPolicy;
use readiness_core::tier1::scoring::{self, Tier1ScoreResult};
use readiness_core::{calculate_tier1_score, tag_responses, Responses};

// ===========================================================================
// Tier-1 scoring tests
// ===========================================================================

#[test]
fn test_documented_ten_question_example() {
    // Eight EMERGING, one BASIC, one ESTABLISHED
    let mut pairs: Vec<(String, &str)> = (1..=8).map(|i| (format!("q{i}"), "EMERGING")).collect();
    pairs.push(("q9".into(), "BASIC"));
    pairs.push(("q10".into(), "ESTABLISHED"));
    let out = calculate_tier1_score(&tag_responses(pairs));
    let r = &out.result;

    // 8 * 50 + 25 + 75 = 500 points over 10 questions = 50
    assert_eq!(r.total_questions, 10);
    assert_eq!(r.overall_score, 50);
    assert_eq!(r.maturity_level, MaturityLevel::Emerging);
    assert_eq!(r.maturity_level.label(), "Emerging");
    assert_eq!(r.breakdown.emerging, 8);
    assert_eq!(r.breakdown.basic, 1);
    assert_eq!(r.breakdown.established, 1);
    assert_eq!(r.breakdown.world_class, 0);
}

#[test]
fn test_empty_responses_zero_state() {
    let out = calculate_tier1_score(&Responses::new());
    assert_eq!(out.result, Tier1ScoreResult::default());
    assert_eq!(out.result.maturity_level.label(), "Basic");
}

#[test]
fn test_all_world_class() {
    let responses = tag_responses((0..5).map(|i| (format!("q{i}"), "WORLD_CLASS")));
    let r = calculate_tier1_score(&responses).result;
    assert_eq!(r.overall_score, 100);
    assert_eq!(r.maturity_level, MaturityLevel::WorldClass);
}

#[test]
fn test_all_basic() {
    let responses = tag_responses((0..5).map(|i| (format!("q{i}"), "basic")));
    let r = calculate_tier1_score(&responses).result;
    assert_eq!(r.overall_score, 25);
    assert_eq!(r.maturity_level, MaturityLevel::Basic);
}

#[test]
fn test_threshold_84_vs_85() {
    // (100 + 100 + 75 + 75 + 75) / 5 = 85
    let responses = tag_responses([
        ("q1", "WORLD_CLASS"),
        ("q2", "WORLD_CLASS"),
        ("q3", "ESTABLISHED"),
        ("q4", "ESTABLISHED"),
        ("q5", "ESTABLISHED"),
    ]);
    let r = calculate_tier1_score(&responses).result;
    assert_eq!(r.overall_score, 85);
    assert_eq!(r.maturity_level, MaturityLevel::WorldClass);

    let policy = ScoringPolicy::default();
    assert_eq!(policy.classify(84), MaturityLevel::Established);
    assert_eq!(policy.classify(49), MaturityLevel::Basic);
    assert_eq!(policy.classify(50), MaturityLevel::Emerging);
}

#[test]
fn test_warnings_surface_unrecognized_tags() {
    let responses = tag_responses([("q1", "EMERGING"), ("q2", "expert")]);
    let out = calculate_tier1_score(&responses);
    // (50 + 0) / 2 = 25
    assert_eq!(out.result.overall_score, 25);
    assert_eq!(out.result.breakdown.unrecognized, 1);
    assert!(out.warnings[0].contains("expert"));
}

#[test]
fn test_envelope_metadata() {
    let out = calculate_tier1_score(&tag_responses([("q1", "BASIC")]));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(!out.methodology.is_empty());
    assert!(out.assumptions.get("thresholds").is_some());
}

#[test]
fn test_custom_point_table() {
    let mut policy = ScoringPolicy::default();
    policy.tier1_points.emerging = rust_decimal_macros::dec!(60);
    let responses = tag_responses([("q1", "EMERGING")]);
    let r = scoring::calculate_tier1_score_with_policy(&responses, &policy).result;
    assert_eq!(r.overall_score, 60);
}

#[test]
fn test_result_serializes_with_report_label() {
    let r = calculate_tier1_score(&tag_responses([("q1", "WORLD_CLASS")])).result;
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["overall_score"], 100);
    assert_eq!(json["maturity_level"], "World Class");
    assert_eq!(json["breakdown"]["world_class"], 1);
}
