use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Type of issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Structure,
    Required,
    Value,
    NotSupported,
    NotFound,
    CodeInvalid,
    Conflict,
    Exception,
    Transient,
    Informational,
}

/// A single issue in an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

/// FHIR OperationOutcome resource (simplified)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    pub issue: Vec<OperationOutcomeIssue>,
}

impl OperationOutcome {
    fn single(severity: IssueSeverity, code: IssueType, diagnostics: &str) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            issue: vec![OperationOutcomeIssue {
                severity,
                code,
                diagnostics: Some(diagnostics.to_string()),
            }],
        }
    }

    /// Outcome carrying one error-severity issue
    pub fn error(code: IssueType, diagnostics: &str) -> Self {
        Self::single(IssueSeverity::Error, code, diagnostics)
    }

    pub fn invalid(diagnostics: &str) -> Self {
        Self::error(IssueType::Invalid, diagnostics)
    }

    pub fn not_found(diagnostics: &str) -> Self {
        Self::error(IssueType::NotFound, diagnostics)
    }

    pub fn conflict(diagnostics: &str) -> Self {
        Self::error(IssueType::Conflict, diagnostics)
    }

    pub fn success(diagnostics: &str) -> Self {
        Self::single(
            IssueSeverity::Information,
            IssueType::Informational,
            diagnostics,
        )
    }

    /// True when any issue is fatal or an error
    pub fn is_error(&self) -> bool {
        self.issue
            .iter()
            .any(|i| matches!(i.severity, IssueSeverity::Fatal | IssueSeverity::Error))
    }
}

impl From<&RecordError> for OperationOutcome {
    fn from(err: &RecordError) -> Self {
        let code = match err {
            RecordError::SchemaViolation(_) => IssueType::Structure,
            RecordError::InvalidEnumValue { .. } => IssueType::CodeInvalid,
            RecordError::TypeMismatch { .. } => IssueType::Invalid,
            RecordError::MalformedEncoding(_) | RecordError::InvalidJson(_) => IssueType::Structure,
        };
        OperationOutcome::error(code, &err.to_string())
    }
}
