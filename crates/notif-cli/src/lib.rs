//! # notif-cli: Notification Action Tooling
//!
//! Exposes the codec for operators and CI pipelines.
//!
//! ## Subcommands
//!
//! - `decode`: relaxed decode, print the canonical encoding
//! - `validate`: strict validation of an Action or ActionOut document
//! - `legacy`: project a version-tagged record rendering
//! - `version`: print the wire version tag
//!
//! ## Exit Codes
//!
//! `0` success, `1` rejected input (malformed or invalid), `2` operational
//! error (unreadable input, missing or broken schemas).

pub mod decode;
pub mod legacy;
pub mod validate;
pub mod version;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notif_ingress::{ActionCodec, CodecConfig, CodecError};
use notif_schema::SchemaError;

/// Load the codec configuration, applying the `--schema-dir` override.
pub fn load_config(config: Option<&Path>, schema_dir: Option<&Path>) -> Result<CodecConfig> {
    let mut loaded = match config {
        Some(path) => CodecConfig::from_yaml_file(path)?,
        None => CodecConfig::default(),
    };
    if let Some(dir) = schema_dir {
        loaded.schema_dir = Some(dir.to_path_buf());
    }
    tracing::debug!(schema_dir = ?loaded.schema_dir, "resolved codec configuration");
    Ok(loaded)
}

/// Build a codec as `config` describes.
pub fn build_codec(config: &CodecConfig) -> Result<ActionCodec> {
    let codec = ActionCodec::from_config(config).context("failed to load Action schemas")?;
    tracing::debug!(
        decode_profile = ?codec.decode_profile(),
        encode_profile = ?codec.encode_profile(),
        "built action codec"
    );
    Ok(codec)
}

/// Read the input document from `path`, or stdin for `None` and `-`.
pub fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Report rejected input on stderr and map it to exit code 1. A record that
/// does not fit its writer schema counts as rejected input. Operational
/// errors are passed through.
pub(crate) fn reject(err: CodecError) -> Result<u8> {
    if let CodecError::Validation(violations) = &err {
        eprintln!("INVALID: {} violation(s)", violations.len());
        for violation in violations {
            eprintln!("  {violation}");
        }
        return Ok(1);
    }
    if let CodecError::Malformed { .. } = &err {
        eprintln!("MALFORMED: {err}");
        return Ok(1);
    }
    if let CodecError::Schema(SchemaError::RecordMismatch { .. }) = &err {
        eprintln!("INVALID: {err}");
        return Ok(1);
    }
    Err(err.into())
}
