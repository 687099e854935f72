use fhir_record::{IssueType, OperationOutcome, RecordError};
use thiserror::Error;

/// Sync client error types
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<&ClientError> for OperationOutcome {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Record(inner) => OperationOutcome::from(inner),
            ClientError::NotFound(msg) => OperationOutcome::not_found(msg),
            ClientError::Transport(msg) => OperationOutcome::error(IssueType::Transient, msg),
            ClientError::Config(msg) => OperationOutcome::error(IssueType::Exception, msg),
        }
    }
}
