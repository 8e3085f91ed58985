//! # Schema Resources
//!
//! Schema documents are static configuration supplied with the build. They
//! are addressed by a resource name relative to the schema root:
//!
//! - `json/Action.json`, `json/Action-out.json`: JSON Schema documents.
//! - `avro/action-<version>.avsc`: record schemas, one per wire version.
//!
//! [`EmbeddedResources`] serves the set compiled into this crate;
//! [`DirectoryResources`] reads the same layout from a directory on disk so a
//! deployment can ship its own schema set.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SchemaError;

/// Resource name of the canonical Action JSON Schema.
pub const ACTION_SCHEMA: &str = "json/Action.json";

/// Resource name of the outbound Action JSON Schema.
pub const ACTION_OUT_SCHEMA: &str = "json/Action-out.json";

/// Resource name of the record schema for `version`.
pub fn record_schema_name(version: &str) -> String {
    format!("avro/action-{version}.avsc")
}

/// A source of named schema documents.
pub trait ResourceSource: fmt::Debug + Send + Sync {
    /// Read the resource called `name`.
    ///
    /// Returns `Ok(None)` when no such resource exists, and an I/O error when
    /// it exists but cannot be read.
    fn read(&self, name: &str) -> io::Result<Option<String>>;
}

const EMBEDDED: &[(&str, &str)] = &[
    (ACTION_SCHEMA, include_str!("../schemas/json/Action.json")),
    (ACTION_OUT_SCHEMA, include_str!("../schemas/json/Action-out.json")),
    ("avro/action-v1.0.0.avsc", include_str!("../schemas/avro/action-v1.0.0.avsc")),
    ("avro/action-v1.1.0.avsc", include_str!("../schemas/avro/action-v1.1.0.avsc")),
    ("avro/action-v2.0.0.avsc", include_str!("../schemas/avro/action-v2.0.0.avsc")),
];

/// The schema set compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedResources;

impl ResourceSource for EmbeddedResources {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        Ok(EMBEDDED
            .iter()
            .find(|(resource, _)| *resource == name)
            .map(|(_, content)| (*content).to_string()))
    }
}

/// Schema resources read from a directory with the embedded layout.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the schema root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for DirectoryResources {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        let path = self.root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Read and parse a JSON resource that must exist.
pub fn load_json(source: &dyn ResourceSource, name: &str) -> Result<Value, SchemaError> {
    let content = source
        .read(name)
        .map_err(|e| SchemaError::SchemaLoad {
            name: name.to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| SchemaError::SchemaLoad {
            name: name.to_string(),
            reason: "resource not found".to_string(),
        })?;

    let value = serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
        name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;

    tracing::debug!(resource = name, "loaded schema resource");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_resources_parse() {
        for (name, _) in EMBEDDED {
            let value = load_json(&EmbeddedResources, name).unwrap();
            assert!(value.is_object(), "{name} is not a JSON object");
        }
    }

    #[test]
    fn test_embedded_missing_resource() {
        assert!(EmbeddedResources.read("json/Nope.json").unwrap().is_none());
        let err = load_json(&EmbeddedResources, "json/Nope.json").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }), "got {err}");
    }

    #[test]
    fn test_directory_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("json")).unwrap();
        std::fs::write(dir.path().join("json/Action.json"), r#"{"type":"object"}"#).unwrap();

        let source = DirectoryResources::new(dir.path());
        assert_eq!(source.root(), dir.path());
        let value = load_json(&source, ACTION_SCHEMA).unwrap();
        assert_eq!(value["type"], "object");
        assert!(source.read(ACTION_OUT_SCHEMA).unwrap().is_none());
    }

    #[test]
    fn test_directory_resources_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("json")).unwrap();
        std::fs::write(dir.path().join("json/Action.json"), "{not json").unwrap();

        let err = load_json(&DirectoryResources::new(dir.path()), ACTION_SCHEMA).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "got {err}");
    }

    #[test]
    fn test_record_schema_name() {
        assert_eq!(record_schema_name("v1.1.0"), "avro/action-v1.1.0.avsc");
    }
}
