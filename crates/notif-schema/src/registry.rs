//! # Schema Registry
//!
//! Resolves a wire version string to its record schema. Schemas are loaded
//! on first request and cached for the life of the registry; concurrent
//! callers asking for the same version all observe one shared schema.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::SchemaError;
use crate::record::RecordSchema;
use crate::resources::{record_schema_name, EmbeddedResources, ResourceSource};

/// Shared handle to a cached record schema.
pub type SchemaHandle = Arc<RecordSchema>;

/// Version-keyed cache of record schemas.
pub struct SchemaRegistry {
    source: Arc<dyn ResourceSource>,
    cache: RwLock<HashMap<String, SchemaHandle>>,
}

impl SchemaRegistry {
    pub fn new(source: Arc<dyn ResourceSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A registry over the schemas compiled into this crate.
    pub fn embedded() -> Self {
        Self::new(Arc::new(EmbeddedResources))
    }

    /// Return the record schema for `version`, loading it if necessary.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownVersion`] if no schema exists for the version.
    /// - [`SchemaError::VersionLoad`] if it exists but cannot be read or parsed.
    pub fn get_schema(&self, version: &str) -> Result<SchemaHandle, SchemaError> {
        if let Some(schema) = self.cache.read().get(version) {
            return Ok(Arc::clone(schema));
        }

        // Loaded outside the lock; a racing loader's result is discarded.
        let loaded = Arc::new(self.load(version)?);
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(version.to_string()).or_insert(loaded)))
    }

    /// Versions currently cached, sorted.
    pub fn cached_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.cache.read().keys().cloned().collect();
        versions.sort();
        versions
    }

    fn load(&self, version: &str) -> Result<RecordSchema, SchemaError> {
        if version.is_empty() || version.contains('/') || version.contains("..") {
            return Err(SchemaError::UnknownVersion {
                version: version.to_string(),
            });
        }

        let name = record_schema_name(version);
        let text = self
            .source
            .read(&name)
            .map_err(|e| SchemaError::VersionLoad {
                version: version.to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| SchemaError::UnknownVersion {
                version: version.to_string(),
            })?;

        let schema = RecordSchema::parse(&text).map_err(|e| SchemaError::VersionLoad {
            version: version.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(version, resource = %name, "loaded record schema");
        Ok(schema)
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("source", &self.source)
            .field("cached_versions", &self.cached_versions())
            .finish()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}
