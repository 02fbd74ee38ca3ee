//! Error types for risk scoring

use thiserror::Error;

/// Errors raised by the scorer and its policy layer.
///
/// Nothing here is retried or recovered: the caller decides whether to skip
/// the offending record or abort the run.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Invalid {field} ({value}): {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid risk policy: {0}")]
    InvalidPolicy(String),

    #[error("Malformed policy JSON: {0}")]
    PolicyParse(#[from] serde_json::Error),

    #[error("Student {student_id}: {source}")]
    Snapshot {
        student_id: String,
        #[source]
        source: Box<RiskError>,
    },
}

impl RiskError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        RiskError::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        match self {
            RiskError::InvalidInput { .. } => true,
            RiskError::Snapshot { source, .. } => source.is_invalid_input(),
            _ => false,
        }
    }
}
