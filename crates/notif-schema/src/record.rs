//! # Record Schemas: Versioned Wire Records
//!
//! Historical producers emit Actions whose shape is governed by a record
//! schema (Avro vocabulary) rather than by the JSON Schema. This module
//! parses those schemas and projects a document written under one version
//! (the *writer* schema) into the shape of another (the *reader* schema).
//!
//! ## Resolution
//!
//! - Reader fields absent from the writer take the reader default; a reader
//!   field without a default that the writer lacks is an error.
//! - Writer fields absent from the reader are checked, then dropped.
//! - A writer field missing from the input takes the writer default, or fails.
//! - Primitives promote `int → long → float → double`; `string ↔ bytes`.
//! - Unions resolve to the first writer branch admitting the value, then to
//!   the first reader branch that branch can be read as.
//! - Records resolve only against records of the same (unqualified) name.
//!
//! The wire rendering is plain JSON: union values are not branch-wrapped.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// The type of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array(Box<FieldType>),
    Map(Box<FieldType>),
    Union(Vec<FieldType>),
    Record(Arc<RecordSchema>),
}

/// One field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub field_type: FieldType,
    pub default: Option<Value>,
}

/// A named record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    namespace: Option<String>,
    fields: Vec<RecordField>,
}

impl RecordSchema {
    /// Parse a record schema from its JSON text.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| mismatch("$", e.to_string()))?;
        Self::from_value(&value)
    }

    /// Parse a record schema from a JSON tree whose top level is a record.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        match parse_type(value, "$")? {
            FieldType::Record(schema) => Ok(Arc::try_unwrap(schema).unwrap_or_else(|shared| (*shared).clone())),
            _ => Err(mismatch("$", "top-level schema must be a record")),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A record value bound to the schema it conforms to.
///
/// Values are stored in schema field order.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Read `document` as a record of `schema`, filling writer defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::RecordMismatch`] if the document does not
    /// conform to the schema.
    pub fn from_value(schema: Arc<RecordSchema>, document: &Value) -> Result<Self, SchemaError> {
        project(document, &schema, schema.clone())
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Value of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    /// `(field name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Render the record as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }
}

/// Serializes as an object with keys in schema order.
impl Serialize for GenericRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Read `document` under `writer` and project it onto `reader`.
pub fn project(
    document: &Value,
    writer: &RecordSchema,
    reader: Arc<RecordSchema>,
) -> Result<GenericRecord, SchemaError> {
    if writer.name != reader.name {
        return Err(mismatch("$", format!("record {} cannot be read as {}", writer.name, reader.name)));
    }
    let values = resolve_record_fields(document, writer, &reader, "$")?;
    Ok(GenericRecord {
        schema: reader,
        values,
    })
}

fn resolve(value: &Value, writer: &FieldType, reader: &FieldType, path: &str) -> Result<Value, SchemaError> {
    match (writer, reader) {
        (FieldType::Union(branches), _) => {
            let branch = branches
                .iter()
                .find(|b| b.admits(value))
                .ok_or_else(|| mismatch(path, format!("{value} matches no branch of {writer}")))?;
            resolve(value, branch, reader, path)
        }
        (_, FieldType::Union(branches)) => {
            let branch = branches
                .iter()
                .find(|b| writer.reads_as(b))
                .ok_or_else(|| mismatch(path, format!("{writer} cannot be read as {reader}")))?;
            resolve(value, writer, branch, path)
        }
        (FieldType::Record(w), FieldType::Record(r)) => {
            if w.name != r.name {
                return Err(mismatch(path, format!("record {} cannot be read as {}", w.name, r.name)));
            }
            let values = resolve_record_fields(value, w, r, path)?;
            Ok(Value::Object(
                r.fields
                    .iter()
                    .map(|f| f.name.clone())
                    .zip(values)
                    .collect(),
            ))
        }
        (FieldType::Array(w), FieldType::Array(r)) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(path, format!("expected array, found {value}")))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| resolve(item, w, r, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        (FieldType::Map(w), FieldType::Map(r)) => {
            let entries = value
                .as_object()
                .ok_or_else(|| mismatch(path, format!("expected map, found {value}")))?;
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), resolve(v, w, r, &format!("{path}.{k}"))?)))
                .collect::<Result<Map<_, _>, SchemaError>>()
                .map(Value::Object)
        }
        (w, r) if w.reads_as(r) => {
            if w.admits(value) {
                Ok(value.clone())
            } else {
                Err(mismatch(path, format!("expected {w}, found {value}")))
            }
        }
        (w, r) => Err(mismatch(path, format!("{w} cannot be read as {r}"))),
    }
}

fn resolve_record_fields(
    value: &Value,
    writer: &RecordSchema,
    reader: &RecordSchema,
    path: &str,
) -> Result<Vec<Value>, SchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| mismatch(path, format!("expected record {}, found {value}", writer.name)))?;

    // Writer-only fields are still read, so malformed input fails even when
    // the reader drops the field.
    for wf in writer.fields.iter().filter(|wf| reader.field(&wf.name).is_none()) {
        let field_path = format!("{path}.{}", wf.name);
        let field_value = writer_value(object, wf, &field_path)?;
        resolve(&field_value, &wf.field_type, &wf.field_type, &field_path)?;
    }

    reader
        .fields
        .iter()
        .map(|rf| {
            let field_path = format!("{path}.{}", rf.name);
            match writer.field(&rf.name) {
                Some(wf) => {
                    let field_value = writer_value(object, wf, &field_path)?;
                    resolve(&field_value, &wf.field_type, &rf.field_type, &field_path)
                }
                None => rf.default.clone().ok_or_else(|| {
                    mismatch(&field_path, "reader field has no default and is absent from the writer")
                }),
            }
        })
        .collect()
}

fn writer_value(object: &Map<String, Value>, field: &RecordField, path: &str) -> Result<Value, SchemaError> {
    object
        .get(&field.name)
        .or(field.default.as_ref())
        .cloned()
        .ok_or_else(|| mismatch(path, "missing field with no default"))
}

impl FieldType {
    /// Whether `value` is a JSON rendering of this type.
    fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Null => value.is_null(),
            Self::Boolean => value.is_boolean(),
            Self::Int => value
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok()),
            Self::Long => value.is_i64(),
            Self::Float | Self::Double => value.is_number(),
            Self::Bytes | Self::String => value.is_string(),
            Self::Array(_) => value.is_array(),
            Self::Map(_) | Self::Record(_) => value.is_object(),
            Self::Union(branches) => branches.iter().any(|b| b.admits(value)),
        }
    }

    /// Whether data written as `self` can be read as `reader`.
    fn reads_as(&self, reader: &FieldType) -> bool {
        use FieldType::*;
        match (self, reader) {
            (Null, Null) | (Boolean, Boolean) => true,
            (Int, Int | Long | Float | Double) => true,
            (Long, Long | Float | Double) => true,
            (Float, Float | Double) | (Double, Double) => true,
            (String | Bytes, String | Bytes) => true,
            (Array(w), Array(r)) | (Map(w), Map(r)) => w.reads_as(r),
            (Record(w), Record(r)) => w.name == r.name,
            (Union(branches), r) => branches.iter().any(|b| b.reads_as(r)),
            (w, Union(branches)) => branches.iter().any(|b| w.reads_as(b)),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean => f.write_str("boolean"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Array(items) => write!(f, "array<{items}>"),
            Self::Map(values) => write!(f, "map<{values}>"),
            Self::Union(branches) => {
                let names: Vec<String> = branches.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", names.join(", "))
            }
            Self::Record(schema) => write!(f, "record {}", schema.name),
        }
    }
}

fn parse_type(value: &Value, path: &str) -> Result<FieldType, SchemaError> {
    match value {
        Value::String(name) => parse_primitive(name, path),
        Value::Array(branches) => branches
            .iter()
            .enumerate()
            .map(|(i, b)| parse_type(b, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldType::Union),
        Value::Object(object) => {
            let kind = object
                .get("type")
                .ok_or_else(|| mismatch(path, "type object has no \"type\""))?;
            match kind.as_str() {
                Some("array") => {
                    let items = object
                        .get("items")
                        .ok_or_else(|| mismatch(path, "array type has no \"items\""))?;
                    Ok(FieldType::Array(Box::new(parse_type(items, &format!("{path}.items"))?)))
                }
                Some("map") => {
                    let values = object
                        .get("values")
                        .ok_or_else(|| mismatch(path, "map type has no \"values\""))?;
                    Ok(FieldType::Map(Box::new(parse_type(values, &format!("{path}.values"))?)))
                }
                Some("record") => parse_record(object, path).map(|r| FieldType::Record(Arc::new(r))),
                _ => parse_type(kind, path),
            }
        }
        other => Err(mismatch(path, format!("invalid type declaration {other}"))),
    }
}

fn parse_primitive(name: &str, path: &str) -> Result<FieldType, SchemaError> {
    Ok(match name {
        "null" => FieldType::Null,
        "boolean" => FieldType::Boolean,
        "int" => FieldType::Int,
        "long" => FieldType::Long,
        "float" => FieldType::Float,
        "double" => FieldType::Double,
        "bytes" => FieldType::Bytes,
        "string" => FieldType::String,
        other => return Err(mismatch(path, format!("unsupported type {other:?}"))),
    })
}

fn parse_record(object: &Map<String, Value>, path: &str) -> Result<RecordSchema, SchemaError> {
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(path, "record has no \"name\""))?;
    let namespace = object
        .get("namespace")
        .and_then(Value::as_str)
        .map(str::to_string);
    let declared = object
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch(path, format!("record {name} has no \"fields\" array")))?;

    let mut fields: Vec<RecordField> = Vec::with_capacity(declared.len());
    for (i, field) in declared.iter().enumerate() {
        let field_path = format!("{path}.{name}.fields[{i}]");
        let field_name = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| mismatch(&field_path, "field has no \"name\""))?;
        if fields.iter().any(|f| f.name == field_name) {
            return Err(mismatch(&field_path, format!("duplicate field {field_name:?}")));
        }
        let declared_type = field
            .get("type")
            .ok_or_else(|| mismatch(&field_path, format!("field {field_name:?} has no \"type\"")))?;
        fields.push(RecordField {
            name: field_name.to_string(),
            field_type: parse_type(declared_type, &field_path)?,
            default: field.get("default").cloned(),
        });
    }

    Ok(RecordSchema {
        name: name.to_string(),
        namespace,
        fields,
    })
}

fn mismatch(path: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::RecordMismatch {
        path: path.to_string(),
        reason: reason.into(),
    }
}
