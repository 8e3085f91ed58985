//! # Schema Errors
//!
//! Failures raised while loading schema resources, compiling validators, or
//! projecting versioned records. Validation *violations* are not errors of
//! this kind; they are collected in [`crate::ValidationViolations`].

use thiserror::Error;

/// Errors returned by the schema layer.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No record schema is registered for the requested version.
    #[error("schema version {version} unavailable: no such version")]
    UnknownVersion {
        /// The version that was requested.
        version: String,
    },

    /// The record schema for a version exists but could not be read or parsed.
    #[error("schema version {version} unavailable: {reason}")]
    VersionLoad {
        /// The version that was requested.
        version: String,
        /// Why loading failed.
        reason: String,
    },

    /// A named schema resource could not be found, read or parsed.
    #[error("failed to load schema {name}: {reason}")]
    SchemaLoad {
        /// Resource name.
        name: String,
        /// Why loading failed.
        reason: String,
    },

    /// A JSON Schema document could not be compiled into a validator.
    #[error("failed to compile schema {name}: {reason}")]
    ValidatorBuild {
        /// Resource name.
        name: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A document does not conform to a record schema, or two record
    /// schemas cannot be resolved against each other.
    #[error("record mismatch at {path}: {reason}")]
    RecordMismatch {
        /// Dotted path to the offending value, `$` for the root.
        path: String,
        /// What did not match.
        reason: String,
    },
}

impl SchemaError {
    /// Whether the error identifies a missing or unreadable schema version.
    pub fn is_version_unavailable(&self) -> bool {
        matches!(self, Self::UnknownVersion { .. } | Self::VersionLoad { .. })
    }
}
