//! # Codec Errors
//!
//! One error type for every codec operation. Validation failures are the
//! expected, recoverable case and carry the complete violation list; the
//! other variants indicate malformed input or a deployment problem.

use notif_schema::{SchemaError, ValidationViolations};
use thiserror::Error;

/// Errors returned by [`crate::ActionCodec`] and the legacy record path.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input text (or an embedded document inside it) is not valid JSON.
    #[error("malformed {context}: {source}")]
    Malformed {
        /// What was being parsed, e.g. `action` or `events[0].payload`.
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but violates the schema or a document rule.
    #[error("validation failed: {0}")]
    Validation(ValidationViolations),

    /// A schema resource or record version could not be used.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A value could not be converted between its tree and typed forms.
    #[error("failed to materialize action: {0}")]
    Materialize(#[source] serde_json::Error),
}

impl CodecError {
    pub(crate) fn malformed(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            context: context.into(),
            source,
        }
    }

    /// The violation list, for validation failures.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::Validation(violations) => Some(violations),
            _ => None,
        }
    }

    /// Whether this is a validation failure rather than an operational error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationViolations> for CodecError {
    fn from(violations: ValidationViolations) -> Self {
        Self::Validation(violations)
    }
}
