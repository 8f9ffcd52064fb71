use thiserror::Error;

use crate::database::StoreError;

/// Failures of a single insight run. Not retried; synchronous callers
/// receive the error, background runs only log it.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Record store unavailable: {0}")]
    RecordStoreUnavailable(#[from] StoreError),

    #[error("Reasoning backend error: {0}")]
    ReasoningBackend(String),

    #[error("Malformed insight response: {0}")]
    MalformedInsightResponse(String),

    #[error("Summary serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AgentError {
    pub fn reasoning(message: impl Into<String>) -> Self {
        AgentError::ReasoningBackend(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        AgentError::MalformedInsightResponse(message.into())
    }
}
