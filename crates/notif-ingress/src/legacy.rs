//! # Legacy Versioned Record Path
//!
//! Producers that predate the canonical schema emit documents shaped by a
//! versioned record schema and tagged with a `version` field. Decoding reads
//! the tag, takes that version's schema as the writer schema, and projects
//! the document onto a reader schema: the current record version for
//! [`LegacyDecoder::decode`], or any registered version for
//! [`LegacyDecoder::decode_record`].
//!
//! Record renderings embed `context` and `payload` as JSON strings; the
//! decoder always parses them, whatever the codec's decode profile says.

use std::sync::Arc;

use notif_core::Action;
use notif_schema::record::project;
use notif_schema::{GenericRecord, SchemaRegistry};
use serde_json::Value;

use crate::codec::ActionCodec;
use crate::error::CodecError;
use crate::profile::EmbeddedDocuments;

/// Writer version assumed when a document carries no `version` tag.
pub const LEGACY_DEFAULT_VERSION: &str = "v1.0.0";

/// Record version that legacy input is projected onto before materializing.
pub const CURRENT_RECORD_VERSION: &str = "v2.0.0";

const VERSION_FIELD: &str = "version";

/// Read the `version` tag of wire JSON.
///
/// Absent and `null` tags yield [`LEGACY_DEFAULT_VERSION`]; non-string tags
/// are returned in their JSON text form.
pub fn read_version(text: &str) -> Result<String, CodecError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| CodecError::malformed("action", e))?;
    Ok(version_of(&document))
}

fn version_of(document: &Value) -> String {
    match document.get(VERSION_FIELD) {
        None | Some(Value::Null) => LEGACY_DEFAULT_VERSION.to_string(),
        Some(Value::String(version)) => version.clone(),
        Some(other) => other.to_string(),
    }
}

/// Decodes version-tagged record renderings.
#[derive(Debug, Clone)]
pub struct LegacyDecoder {
    registry: Arc<SchemaRegistry>,
    codec: Arc<ActionCodec>,
}

impl LegacyDecoder {
    pub fn new(registry: Arc<SchemaRegistry>, codec: Arc<ActionCodec>) -> Self {
        Self { registry, codec }
    }

    /// Decode a record rendering of any registered version into an Action.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Schema`] if the writer version is not registered or
    ///   the document does not conform to it.
    /// - [`CodecError::Validation`] if the projected Action is invalid.
    pub fn decode(&self, text: &str) -> Result<Action, CodecError> {
        let record = self.decode_record(text, CURRENT_RECORD_VERSION)?;
        self.codec
            .decode_tree(record.to_value(), EmbeddedDocuments::Parse)
    }

    /// Project a record rendering onto the `reader_version` schema.
    pub fn decode_record(&self, text: &str, reader_version: &str) -> Result<GenericRecord, CodecError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| CodecError::malformed("record", e))?;
        let writer_version = version_of(&document);
        tracing::trace!(writer = %writer_version, reader = reader_version, "projecting record");

        let writer = self.registry.get_schema(&writer_version)?;
        let reader = self.registry.get_schema(reader_version)?;
        Ok(project(&document, &writer, reader)?)
    }
}

/// Renders records, and Actions as records, to JSON text.
#[derive(Debug, Clone)]
pub struct LegacyEncoder {
    registry: Arc<SchemaRegistry>,
}

impl LegacyEncoder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Serialize `record` against its own schema.
    pub fn encode_record(&self, record: &GenericRecord) -> Result<String, CodecError> {
        serde_json::to_string(record).map_err(CodecError::Materialize)
    }

    /// Render `action` as a [`CURRENT_RECORD_VERSION`] record.
    ///
    /// The record's `version` tag names the record version, so the output
    /// decodes through [`LegacyDecoder::decode`]. Event metadata and
    /// unrecognized event keys have no place in the record and are dropped.
    pub fn encode_action(&self, action: &Action) -> Result<String, CodecError> {
        let schema = self.registry.get_schema(CURRENT_RECORD_VERSION)?;
        let document = record_document(action)?;
        let record = GenericRecord::from_value(schema, &document)?;
        self.encode_record(&record)
    }
}

fn record_document(action: &Action) -> Result<Value, CodecError> {
    let mut document = serde_json::to_value(action).map_err(CodecError::Materialize)?;
    document[VERSION_FIELD] = Value::from(CURRENT_RECORD_VERSION);
    embed_as_string(&mut document, "context")?;
    if let Some(Value::Array(events)) = document.get_mut("events") {
        for event in events {
            embed_as_string(event, "payload")?;
        }
    }
    Ok(document)
}

fn embed_as_string(container: &mut Value, field: &str) -> Result<(), CodecError> {
    if let Some(target) = container.get_mut(field) {
        if target.is_object() {
            let text = serde_json::to_string(&*target).map_err(CodecError::Materialize)?;
            *target = Value::String(text);
        }
    }
    Ok(())
}
