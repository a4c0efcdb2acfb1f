use clap::Args;
use serde_json::Value;

use readiness_core::policy::ScoringPolicy;
use readiness_core::stored::parse_score_blob;
use readiness_core::tier1::scoring::calculate_tier1_score_with_policy;
use readiness_core::tier1::sections::calculate_tier1_section_scores;
use readiness_core::tier2::backfill::backfill_tier2_detail;
use readiness_core::tier2::scoring::calculate_tier2_score_with_policy;
use readiness_core::types::Responses;

use super::load_catalog;
use crate::input;

/// Arguments for Tier-1 scoring
#[derive(Args)]
pub struct Tier1Args {
    /// Path to JSON responses (question id to maturity tag)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for Tier-1 section scores
#[derive(Args)]
pub struct SectionsArgs {
    /// Path to JSON responses (question id to maturity tag)
    #[arg(long)]
    pub input: Option<String>,
    /// Path to the question catalog
    #[arg(long)]
    pub catalog: String,
    /// Template id within a multi-template catalog
    #[arg(long)]
    pub template: Option<String>,
}

/// Arguments for Tier-2 scoring
#[derive(Args)]
pub struct Tier2Args {
    /// Path to JSON responses (question id to tag or points)
    #[arg(long)]
    pub input: Option<String>,
    /// Path to the question catalog
    #[arg(long)]
    pub catalog: String,
    /// Template id within a multi-template catalog
    #[arg(long)]
    pub template: Option<String>,
}

/// Arguments for backfilling a stored Tier-2 result
#[derive(Args)]
pub struct BackfillArgs {
    /// Path to the stored score summary
    #[arg(long)]
    pub score: String,
    /// Path to the raw responses the score was computed from
    #[arg(long)]
    pub responses: String,
    /// Path to the question catalog
    #[arg(long)]
    pub catalog: String,
    /// Template id within a multi-template catalog
    #[arg(long)]
    pub template: Option<String>,
}

pub fn run_tier1(args: Tier1Args, policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let responses: Responses = input::file_or_stdin(args.input.as_deref(), "Tier-1 scoring")?;
    let result = calculate_tier1_score_with_policy(&responses, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_sections(
    args: SectionsArgs,
    policy: &ScoringPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let responses: Responses = input::file_or_stdin(args.input.as_deref(), "section scoring")?;
    let catalog = load_catalog(&args.catalog, args.template.as_deref())?;
    let result = calculate_tier1_section_scores(&responses, &catalog, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_tier2(args: Tier2Args, policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let responses: Responses = input::file_or_stdin(args.input.as_deref(), "Tier-2 scoring")?;
    let catalog = load_catalog(&args.catalog, args.template.as_deref())?;
    let result = calculate_tier2_score_with_policy(&responses, &catalog, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_backfill(
    args: BackfillArgs,
    policy: &ScoringPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (_, score_blob) = input::file::read_text(&args.score)?;
    let stored = parse_score_blob(&score_blob)?;
    let responses: Responses = input::file::read_json(&args.responses)?;
    let catalog = load_catalog(&args.catalog, args.template.as_deref())?;

    let result = backfill_tier2_detail(&stored, &responses, &catalog, policy);
    Ok(serde_json::to_value(result)?)
}
