use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid scoring policy: {0}")]
    InvalidPolicy(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: String, id: String },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<serde_json::Error> for ReadinessError {
    fn from(e: serde_json::Error) -> Self {
        ReadinessError::SerializationError(e.to_string())
    }
}
