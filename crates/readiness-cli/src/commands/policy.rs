use serde_json::Value;
use std::path::Path;

use readiness_core::policy::ScoringPolicy;

use crate::input;

/// Load and validate a policy file; the reference policy when no path.
pub fn load_policy(path: Option<&str>) -> Result<ScoringPolicy, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ScoringPolicy::default());
    };

    let (canonical, contents) = input::file::read_text(path)?;
    let is_yaml = Path::new(&canonical)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let policy = if is_yaml {
        let policy: ScoringPolicy = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
        policy.validate()?;
        policy
    } else {
        ScoringPolicy::from_json_str(&contents)?
    };

    tracing::debug!(path = %canonical.display(), "loaded scoring policy");
    Ok(policy)
}

pub fn run_policy(policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(policy)?)
}
