//! # Structural Validation
//!
//! Evaluates a JSON Schema (draft 7) document against a candidate document
//! tree. A single call:
//!
//! 1. applies the schema's declared defaults to the tree in place;
//! 2. collects every structural violation reported by the `jsonschema`
//!    crate, with the format extensions from [`crate::formats`] installed;
//! 3. runs the attached [`DocumentRule`]s and appends their violations.
//!
//! Callers receive one ordered [`ValidationViolations`] list regardless of
//! where each violation came from. The list is never truncated.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError, Validator};
use notif_core::TemporalMode;
use serde_json::Value;

use crate::defaults::apply_defaults;
use crate::error::SchemaError;
use crate::formats;
use crate::resources::{load_json, ResourceSource};
use crate::rules::DocumentRule;

/// Classification of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// A required property is missing.
    Required,
    /// A value has the wrong JSON type.
    Type,
    /// A string is shorter than allowed.
    MinLength,
    /// An array has fewer items than allowed.
    MinItems,
    /// An object carries a property the schema does not declare.
    UnexpectedProperty,
    /// A string does not match its declared format.
    Format,
    /// A post-structural rule failed.
    Rule,
    /// Any other schema keyword failed.
    Other,
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value; empty for the document root.
    /// For missing required properties this points at the missing property.
    pub location: String,
    /// Human-readable description.
    pub message: String,
    /// What kind of check failed.
    pub kind: ViolationKind,
}

impl Violation {
    fn from_error(error: &ValidationError<'_>) -> Self {
        let mut location = error.instance_path.to_string();
        let kind = match &error.kind {
            ValidationErrorKind::Required { property } => {
                if let Some(name) = property.as_str() {
                    location.push('/');
                    location.push_str(&escape_pointer_token(name));
                }
                ViolationKind::Required
            }
            ValidationErrorKind::Type { .. } => ViolationKind::Type,
            ValidationErrorKind::MinLength { .. } => ViolationKind::MinLength,
            ValidationErrorKind::MinItems { .. } => ViolationKind::MinItems,
            ValidationErrorKind::AdditionalProperties { .. } => ViolationKind::UnexpectedProperty,
            ValidationErrorKind::Format { .. } => ViolationKind::Format,
            _ => ViolationKind::Other,
        };
        Self {
            location,
            message: error.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Keep only the violations for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Violation) -> bool) {
        self.violations.retain(keep);
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled JSON Schema plus the rules evaluated after it.
///
/// `StructuralValidator` is `Send + Sync`; compile it once and share it.
pub struct StructuralValidator {
    name: String,
    schema: Value,
    compiled: Validator,
    mode: TemporalMode,
    rules: Vec<Box<dyn DocumentRule>>,
}

impl fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("rules", &self.rules)
            .finish()
    }
}

impl StructuralValidator {
    /// Compile `schema`, parsing `date-time` values under `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidatorBuild`] if the schema is not a valid
    /// draft 7 document.
    pub fn compile(
        name: impl Into<String>,
        schema: Value,
        mode: TemporalMode,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut options = jsonschema::options();
        options.with_draft(Draft::Draft7);
        formats::register(&mut options, mode);

        let compiled = options
            .build(&schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(schema = %name, ?mode, "compiled structural validator");
        Ok(Self {
            name,
            schema,
            compiled,
            mode,
            rules: Vec::new(),
        })
    }

    /// Load the JSON Schema resource `name` from `source` and compile it.
    pub fn load(
        source: &dyn ResourceSource,
        name: &str,
        mode: TemporalMode,
    ) -> Result<Self, SchemaError> {
        let schema = load_json(source, name)?;
        Self::compile(name, schema, mode)
    }

    /// Attach a post-structural rule.
    pub fn with_rule(mut self, rule: impl DocumentRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The schema resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The temporal mode used by the `date-time` format.
    pub fn mode(&self) -> TemporalMode {
        self.mode
    }

    /// Apply defaults to `document`, then validate it.
    pub fn validate(&self, document: &mut Value) -> ValidationViolations {
        apply_defaults(&self.schema, document);
        self.check(document)
    }

    /// Validate `document` as is, without applying defaults.
    pub fn check(&self, document: &Value) -> ValidationViolations {
        let mut violations: Vec<Violation> = self
            .compiled
            .iter_errors(document)
            .map(|e| Violation::from_error(&e))
            .collect();
        violations.extend(self.rules.iter().filter_map(|rule| rule.check(document)));

        if !violations.is_empty() {
            tracing::debug!(
                schema = %self.name,
                count = violations.len(),
                "document failed validation"
            );
        }
        violations.into()
    }
}
