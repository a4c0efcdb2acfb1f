use clap::Args;
use serde_json::Value;

use readiness_core::policy::ScoringPolicy;
use readiness_core::repository::InMemoryAssessmentRepository;
use readiness_core::service::build_team_report;
use readiness_core::stored::{parse_stored_assessments, StoredAssessment};
use readiness_core::team::averages::compute_team_averages_with_policy;

use super::load_catalog;
use crate::input;

/// Arguments for team averaging
#[derive(Args)]
pub struct TeamArgs {
    /// Path to a JSON array of stored assessments
    #[arg(long)]
    pub input: Option<String>,
    /// Path to the question catalog
    #[arg(long)]
    pub catalog: String,
    /// Template id within a multi-template catalog
    #[arg(long)]
    pub template: Option<String>,
    /// Only average assessments of this company
    #[arg(long)]
    pub company: Option<String>,
}

/// Arguments for an individual-vs-team report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to a JSON array of stored assessments
    #[arg(long)]
    pub input: Option<String>,
    /// Path to the question catalog
    #[arg(long)]
    pub catalog: String,
    /// Template id within a multi-template catalog
    #[arg(long)]
    pub template: Option<String>,
    /// Assessment to compare against its company
    #[arg(long)]
    pub assessment: String,
}

fn load_assessments(
    path: Option<&str>,
) -> Result<(Vec<StoredAssessment>, Vec<String>), Box<dyn std::error::Error>> {
    let records: Vec<Value> = input::file_or_stdin(path, "stored assessments")?;
    let (assessments, warnings) = parse_stored_assessments(records);
    for w in &warnings {
        tracing::warn!("{}", w);
    }
    Ok((assessments, warnings))
}

pub fn run_team(args: TeamArgs, policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let (mut assessments, parse_warnings) = load_assessments(args.input.as_deref())?;
    if let Some(ref company) = args.company {
        assessments.retain(|a| &a.company_id == company);
    }
    let catalog = load_catalog(&args.catalog, args.template.as_deref())?;

    let mut result = compute_team_averages_with_policy(&assessments, &catalog, policy);
    result.warnings = parse_warnings
        .into_iter()
        .chain(std::mem::take(&mut result.warnings))
        .collect();
    Ok(serde_json::to_value(result)?)
}

pub fn run_report(
    args: ReportArgs,
    policy: &ScoringPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (assessments, parse_warnings) = load_assessments(args.input.as_deref())?;
    let catalog = load_catalog(&args.catalog, args.template.as_deref())?;
    let repo = InMemoryAssessmentRepository::with_assessments(assessments);

    let mut result = build_team_report(&repo, &args.assessment, &catalog, policy)?;
    result.warnings = parse_warnings
        .into_iter()
        .chain(std::mem::take(&mut result.warnings))
        .collect();
    Ok(serde_json::to_value(result)?)
}
