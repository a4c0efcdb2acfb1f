//! Stored assessments as handed over by the persistence collaborator, and
//! defensive parsing of their JSON blobs.
//!
//! Blobs are sometimes double encoded (a JSON string whose contents are the
//! JSON document). Both shapes are accepted. Anything unparseable is a
//! recoverable [`ReadinessError`], never a panic.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReadinessError;
use crate::tier2::scoring::Tier2ScoreResult;
use crate::types::Responses;
use crate::ReadinessResult;

/// One completed Tier-2 assessment as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub assessment_id: String,
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Stored score summary. Absent when only the raw answers survived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Tier2ScoreResult>,
    /// Raw answers the score was computed from, needed for backfill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Responses>,
}

/// Parse a stored Tier-2 score summary blob.
pub fn parse_score_blob(json: &str) -> ReadinessResult<Tier2ScoreResult> {
    decode_embedded(serde_json::from_str(json)?, "score")
}

/// Parse a raw response blob (question id to answer).
pub fn parse_response_blob(json: &str) -> ReadinessResult<Responses> {
    decode_embedded(serde_json::from_str(json)?, "responses")
}

/// Parse a full stored assessment record. `score` and `responses` may be
/// embedded objects or encoded strings.
pub fn parse_stored_assessment(json: &str) -> ReadinessResult<StoredAssessment> {
    let value: Value = serde_json::from_str(json)?;
    stored_assessment_from_value(value)
}

pub fn stored_assessment_from_value(value: Value) -> ReadinessResult<StoredAssessment> {
    let value = unwrap_encoded(value, "assessment")?;
    let Value::Object(mut record) = value else {
        return Err(ReadinessError::InvalidInput {
            field: "assessment".into(),
            reason: "Expected a JSON object.".into(),
        });
    };

    let score = match record.remove("score") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(decode_embedded(raw, "score")?),
    };
    let responses = match record.remove("responses") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(decode_embedded(raw, "responses")?),
    };

    let mut assessment: StoredAssessment = serde_json::from_value(Value::Object(record))?;
    if assessment.assessment_id.trim().is_empty() {
        return Err(ReadinessError::InvalidInput {
            field: "assessment_id".into(),
            reason: "Assessment id must not be empty.".into(),
        });
    }
    assessment.score = score;
    assessment.responses = responses;
    Ok(assessment)
}

/// Parse many records, keeping the good ones and describing the rest.
pub fn parse_stored_assessments(values: Vec<Value>) -> (Vec<StoredAssessment>, Vec<String>) {
    let mut parsed = Vec::with_capacity(values.len());
    let mut warnings = Vec::new();
    for (i, value) in values.into_iter().enumerate() {
        match stored_assessment_from_value(value) {
            Ok(assessment) => parsed.push(assessment),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "skipping malformed stored assessment");
                warnings.push(format!("Stored assessment #{}: {}", i, e));
            }
        }
    }
    (parsed, warnings)
}

fn unwrap_encoded(value: Value, field: &str) -> ReadinessResult<Value> {
    match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(|e| {
            ReadinessError::SerializationError(format!("{field}: {e}"))
        }),
        other => Ok(other),
    }
}

fn decode_embedded<T: DeserializeOwned>(value: Value, field: &str) -> ReadinessResult<T> {
    let value = unwrap_encoded(value, field)?;
    serde_json::from_value(value)
        .map_err(|e| ReadinessError::SerializationError(format!("{field}: {e}")))
}
