//! # Codec Configuration
//!
//! Deserialized from YAML (or JSON, which YAML accepts). Every field is
//! optional:
//!
//! ```yaml
//! schema_dir: /etc/notifications/schemas
//! decode_profile:
//!   temporal: relaxed
//!   embedded_documents: parse
//!   unknown_event_properties: tolerate
//! encode_profile:
//!   temporal: strict
//!   embedded_documents: reject
//!   unknown_event_properties: reject
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notif_schema::{DirectoryResources, EmbeddedResources, ResourceSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::Profile;

/// Errors loading a [`CodecConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings for building an [`crate::ActionCodec`] and its registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Read schema resources from this directory instead of the embedded set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
    #[serde(default = "Profile::relaxed")]
    pub decode_profile: Profile,
    #[serde(default = "Profile::strict")]
    pub encode_profile: Profile,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            decode_profile: Profile::relaxed(),
            encode_profile: Profile::strict(),
        }
    }
}

impl CodecConfig {
    /// Parse a configuration document.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load a configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The schema resource source this configuration selects.
    pub fn resources(&self) -> Arc<dyn ResourceSource> {
        match &self.schema_dir {
            Some(dir) => Arc::new(DirectoryResources::new(dir)),
            None => Arc::new(EmbeddedResources),
        }
    }
}
