mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::scoring::{BackfillArgs, SectionsArgs, Tier1Args, Tier2Args};
use commands::team::{ReportArgs, TeamArgs};

/// Digital readiness assessment scoring
#[derive(Parser)]
#[command(
    name = "readiness",
    version,
    about = "Digital readiness assessment scoring",
    long_about = "Scores digital readiness self-assessments. Supports Tier-1 maturity \
                  scoring, Tier-2 pillar-weighted scoring with dimension detail, \
                  backfill of legacy results, and team averages with gap analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Scoring policy file (YAML or JSON); defaults to the reference policy
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Log scoring details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a flat Tier-1 response set
    Tier1(Tier1Args),
    /// Tier-1 scores per catalog section
    Tier1Sections(SectionsArgs),
    /// Score a Tier-2 response set against a question catalog
    Tier2(Tier2Args),
    /// Rebuild dimension detail for a stored Tier-2 result
    Backfill(BackfillArgs),
    /// Average a company's stored Tier-2 assessments
    Team(TeamArgs),
    /// Compare one stored assessment against its company's averages
    Report(ReportArgs),
    /// Print the effective scoring policy
    Policy,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = match commands::policy::load_policy(cli.policy.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Tier1(args) => commands::scoring::run_tier1(args, &policy),
        Commands::Tier1Sections(args) => commands::scoring::run_sections(args, &policy),
        Commands::Tier2(args) => commands::scoring::run_tier2(args, &policy),
        Commands::Backfill(args) => commands::scoring::run_backfill(args, &policy),
        Commands::Team(args) => commands::team::run_team(args, &policy),
        Commands::Report(args) => commands::team::run_report(args, &policy),
        Commands::Policy => commands::policy::run_policy(&policy),
        Commands::Version => {
            println!("readiness {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
