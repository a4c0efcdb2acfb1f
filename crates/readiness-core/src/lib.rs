pub mod catalog;
pub mod error;
pub mod maturity;
pub mod policy;
pub mod types;

#[cfg(feature = "tier1")]
pub mod tier1;

#[cfg(feature = "tier2")]
pub mod tier2;

#[cfg(feature = "tier2")]
pub mod stored;

#[cfg(feature = "tier2")]
pub mod repository;

#[cfg(feature = "team")]
pub mod team;

#[cfg(feature = "team")]
pub mod service;

pub use catalog::{CatalogSource, Question, QuestionCatalog, QuestionOption};
pub use error::ReadinessError;
pub use maturity::MaturityLevel;
pub use policy::ScoringPolicy;
pub use types::*;

#[cfg(feature = "tier1")]
pub use tier1::scoring::calculate_tier1_score;

#[cfg(feature = "tier2")]
pub use tier2::backfill::backfill_dimension_scores;
#[cfg(feature = "tier2")]
pub use tier2::scoring::calculate_tier2_score;

#[cfg(feature = "team")]
pub use team::averages::compute_team_averages;

/// Standard result type for the fallible edges of the engine: policy
/// validation, blob parsing and repository access.
pub type ReadinessResult<T> = Result<T, ReadinessError>;
