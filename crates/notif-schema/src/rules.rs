//! # Post-Structural Rules
//!
//! Cross-field invariants that a declarative schema cannot express. Each rule
//! inspects the defaulted document after structural validation and appends
//! its violation to the same collection, tagged at the document root.

use std::fmt;

use serde_json::Value;

use crate::validate::{Violation, ViolationKind};

/// A document-level invariant checked after structural validation.
pub trait DocumentRule: fmt::Debug + Send + Sync {
    /// Returns a violation when `document` breaks the rule.
    fn check(&self, document: &Value) -> Option<Violation>;
}

/// Requires at least one of the named top-level fields to hold a string.
///
/// Any one field alone satisfies the rule; absent and `null` fields do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtLeastOneOf {
    fields: Vec<String>,
}

impl AtLeastOneOf {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl DocumentRule for AtLeastOneOf {
    fn check(&self, document: &Value) -> Option<Violation> {
        let satisfied = self
            .fields
            .iter()
            .any(|field| document.get(field).is_some_and(Value::is_string));
        if satisfied {
            return None;
        }

        let names: Vec<String> = self.fields.iter().map(|f| format!("{f:?}")).collect();
        Some(Violation {
            location: String::new(),
            message: format!("at least one of {} must be a non-null string", names.join(", ")),
            kind: ViolationKind::Rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule() -> AtLeastOneOf {
        AtLeastOneOf::new(["account_id", "org_id"])
    }

    #[test]
    fn test_either_field_alone_satisfies() {
        assert!(rule().check(&json!({ "account_id": "a" })).is_none());
        assert!(rule().check(&json!({ "org_id": "o" })).is_none());
        assert!(rule().check(&json!({ "account_id": null, "org_id": "o" })).is_none());
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        assert_eq!(rule().fields(), ["account_id", "org_id"]);
    }

    #[test]
    fn test_both_fields_satisfy() {
        assert!(rule().check(&json!({ "account_id": "a", "org_id": "o" })).is_none());
    }

    #[test]
    fn test_both_absent_or_null_violates() {
        for doc in [json!({}), json!({ "account_id": null, "org_id": null })] {
            let violation = rule().check(&doc).expect("rule should fire");
            assert_eq!(violation.location, "");
            assert_eq!(violation.kind, ViolationKind::Rule);
            assert!(violation.message.contains("account_id"));
            assert!(violation.message.contains("org_id"));
        }
    }

    #[test]
    fn test_non_string_values_do_not_satisfy() {
        assert!(rule().check(&json!({ "account_id": 42 })).is_some());
    }
}
