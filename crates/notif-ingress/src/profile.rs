//! # Strictness Profiles
//!
//! Historical producers are loose: they send offset timestamps, double-encode
//! `context` and `payload` as JSON strings, and add keys to events. A
//! [`Profile`] states which of those liberties a codec direction accepts.
//! Decoding uses [`Profile::relaxed`]; encoding and validation use
//! [`Profile::strict`].

use notif_core::TemporalMode;
use notif_schema::{ValidationViolations, ViolationKind};
use serde::{Deserialize, Serialize};

/// Handling of `context` and `events[].payload` given as JSON strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedDocuments {
    /// Parse the string and substitute the resulting document.
    Parse,
    /// Leave the string in place; validation reports a type violation.
    Reject,
}

/// Handling of event keys other than `metadata` and `payload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEventProperties {
    /// Keep them on the decoded event.
    Tolerate,
    /// Report them as violations.
    Reject,
}

/// A validation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub temporal: TemporalMode,
    pub embedded_documents: EmbeddedDocuments,
    pub unknown_event_properties: UnknownEventProperties,
}

impl Profile {
    /// The profile for producer input.
    pub const fn relaxed() -> Self {
        Self {
            temporal: TemporalMode::Relaxed,
            embedded_documents: EmbeddedDocuments::Parse,
            unknown_event_properties: UnknownEventProperties::Tolerate,
        }
    }

    /// The profile for canonical output.
    pub const fn strict() -> Self {
        Self {
            temporal: TemporalMode::Strict,
            embedded_documents: EmbeddedDocuments::Reject,
            unknown_event_properties: UnknownEventProperties::Reject,
        }
    }

    /// Drop the violations this profile tolerates.
    pub(crate) fn filter(&self, violations: &mut ValidationViolations) {
        if self.unknown_event_properties == UnknownEventProperties::Tolerate {
            violations.retain(|v| {
                !(v.kind == ViolationKind::UnexpectedProperty && is_event_location(&v.location))
            });
        }
    }
}

/// Matches `/events/<index>`.
fn is_event_location(location: &str) -> bool {
    location
        .strip_prefix("/events/")
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}
