//! # Action Codec
//!
//! Converts between wire JSON and [`Action`] values, validating in both
//! directions against the same schema and document rules:
//!
//! - **decode**: parse, normalize embedded documents, validate with
//!   defaults applied, materialize. Uses the decode profile.
//! - **encode**: convert to a tree, validate, serialize compactly. Uses the
//!   encode profile, so nothing that fails strict validation is ever emitted.
//! - **validate**: the same check without materializing or serializing.
//!
//! Outbound [`ActionOut`] values are checked against their own schema and
//! are never decoded.

use std::sync::Arc;

use notif_core::{Action, ActionOut};
use notif_schema::{
    AtLeastOneOf, EmbeddedResources, ResourceSource, SchemaError, StructuralValidator,
    ValidationViolations, ACTION_OUT_SCHEMA, ACTION_SCHEMA,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::profile::{EmbeddedDocuments, Profile};

const CONTEXT_FIELD: &str = "context";
const EVENTS_FIELD: &str = "events";
const PAYLOAD_FIELD: &str = "payload";

/// The fields of which at least one must identify the tenant.
const TENANT_FIELDS: [&str; 2] = ["account_id", "org_id"];

/// Validating codec for notification Actions.
///
/// Holds compiled validators only; share one instance across threads.
#[derive(Debug)]
pub struct ActionCodec {
    decode_profile: Profile,
    encode_profile: Profile,
    decoder: StructuralValidator,
    encoder: StructuralValidator,
    outbound: StructuralValidator,
}

impl ActionCodec {
    /// Compile the Action and ActionOut schemas from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a schema is missing, unparseable, or
    /// not a valid draft 7 document.
    pub fn new(
        source: &dyn ResourceSource,
        decode_profile: Profile,
        encode_profile: Profile,
    ) -> Result<Self, SchemaError> {
        let tenant = AtLeastOneOf::new(TENANT_FIELDS);
        let decoder = StructuralValidator::load(source, ACTION_SCHEMA, decode_profile.temporal)?
            .with_rule(tenant.clone());
        let encoder = StructuralValidator::load(source, ACTION_SCHEMA, encode_profile.temporal)?
            .with_rule(tenant.clone());
        let outbound =
            StructuralValidator::load(source, ACTION_OUT_SCHEMA, encode_profile.temporal)?
                .with_rule(tenant);

        Ok(Self {
            decode_profile,
            encode_profile,
            decoder,
            encoder,
            outbound,
        })
    }

    /// A codec over the embedded schemas with the default profiles.
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::new(&EmbeddedResources, Profile::relaxed(), Profile::strict())
    }

    /// A codec built as `config` describes.
    pub fn from_config(config: &CodecConfig) -> Result<Self, SchemaError> {
        Self::with_resources(config, config.resources())
    }

    /// A codec with `config`'s profiles over an explicit resource source.
    pub fn with_resources(
        config: &CodecConfig,
        source: Arc<dyn ResourceSource>,
    ) -> Result<Self, SchemaError> {
        Self::new(source.as_ref(), config.decode_profile, config.encode_profile)
    }

    pub fn decode_profile(&self) -> &Profile {
        &self.decode_profile
    }

    pub fn encode_profile(&self) -> &Profile {
        &self.encode_profile
    }

    /// Decode wire JSON into an Action.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Malformed`] if the text, or an embedded document
    ///   inside it, is not JSON.
    /// - [`CodecError::Validation`] with every violation found.
    pub fn decode(&self, text: &str) -> Result<Action, CodecError> {
        tracing::trace!(len = text.len(), "decoding action");
        let tree = parse_json(text, "action")?;
        self.decode_value(tree)
    }

    /// Decode an already-parsed wire document.
    pub fn decode_value(&self, tree: Value) -> Result<Action, CodecError> {
        self.decode_tree(tree, self.decode_profile.embedded_documents)
    }

    /// Decode a tree whose embedded documents follow `embedded`, regardless
    /// of the decode profile. Record-path input always embeds them.
    pub(crate) fn decode_tree(
        &self,
        mut tree: Value,
        embedded: EmbeddedDocuments,
    ) -> Result<Action, CodecError> {
        if embedded == EmbeddedDocuments::Parse {
            parse_embedded_documents(&mut tree)?;
        }
        check(&self.decoder, &self.decode_profile, &mut tree)?;
        serde_json::from_value(tree).map_err(CodecError::Materialize)
    }

    /// Validate `action` and serialize it as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Validation`] if the Action breaks any invariant;
    /// an Action that would fail to decode is never encoded.
    pub fn encode(&self, action: &Action) -> Result<String, CodecError> {
        tracing::trace!(bundle = %action.bundle, application = %action.application, "encoding action");
        let tree = self.validated_tree(action, &self.encoder)?;
        to_json(&tree)
    }

    /// Check `action` under the encode profile.
    pub fn validate(&self, action: &Action) -> Result<(), CodecError> {
        self.validated_tree(action, &self.encoder).map(drop)
    }

    /// Check wire JSON under the encode profile without materializing it.
    pub fn validate_json(&self, text: &str) -> Result<(), CodecError> {
        let mut tree = parse_json(text, "action")?;
        if self.encode_profile.embedded_documents == EmbeddedDocuments::Parse {
            parse_embedded_documents(&mut tree)?;
        }
        check(&self.encoder, &self.encode_profile, &mut tree)
    }

    /// Validate `action_out` against the outbound schema and serialize it.
    pub fn encode_action_out(&self, action_out: &ActionOut) -> Result<String, CodecError> {
        let tree = self.validated_tree(action_out, &self.outbound)?;
        to_json(&tree)
    }

    /// Check `action_out` against the outbound schema.
    pub fn validate_action_out(&self, action_out: &ActionOut) -> Result<(), CodecError> {
        self.validated_tree(action_out, &self.outbound).map(drop)
    }

    /// Check outbound wire JSON against the outbound schema.
    pub fn validate_action_out_json(&self, text: &str) -> Result<(), CodecError> {
        let mut tree = parse_json(text, "action")?;
        check(&self.outbound, &self.encode_profile, &mut tree)
    }

    fn validated_tree<T: Serialize>(
        &self,
        value: &T,
        validator: &StructuralValidator,
    ) -> Result<Value, CodecError> {
        let mut tree = serde_json::to_value(value).map_err(CodecError::Materialize)?;
        check(validator, &self.encode_profile, &mut tree)?;
        Ok(tree)
    }
}

fn check(
    validator: &StructuralValidator,
    profile: &Profile,
    tree: &mut Value,
) -> Result<(), CodecError> {
    let mut violations: ValidationViolations = validator.validate(tree);
    profile.filter(&mut violations);
    violations.into_result().map_err(CodecError::Validation)
}

fn parse_json<T: DeserializeOwned>(text: &str, context: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::malformed(context, e))
}

fn to_json(tree: &Value) -> Result<String, CodecError> {
    serde_json::to_string(tree).map_err(CodecError::Materialize)
}

/// Replace string-valued `context` and `events[].payload` with the documents
/// they encode. Values of any other type are left for validation.
fn parse_embedded_documents(tree: &mut Value) -> Result<(), CodecError> {
    parse_field_if_string(tree, CONTEXT_FIELD, CONTEXT_FIELD)?;
    if let Some(Value::Array(events)) = tree.get_mut(EVENTS_FIELD) {
        for (i, event) in events.iter_mut().enumerate() {
            let context = format!("{EVENTS_FIELD}[{i}].{PAYLOAD_FIELD}");
            parse_field_if_string(event, PAYLOAD_FIELD, &context)?;
        }
    }
    Ok(())
}

fn parse_field_if_string(container: &mut Value, field: &str, context: &str) -> Result<(), CodecError> {
    let Some(target) = container.get_mut(field) else {
        return Ok(());
    };
    if let Value::String(text) = target {
        let parsed = parse_json(text, context)?;
        *target = parsed;
    }
    Ok(())
}
