//! # Legacy Subcommand
//!
//! Projects a version-tagged record rendering. Without `--reader-version`
//! the record is decoded into an Action and printed canonically; with it,
//! the projected record is printed in that version's shape.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use notif_ingress::{CodecConfig, CodecError, LegacyDecoder, LegacyEncoder};
use notif_schema::{SchemaError, SchemaRegistry};

use crate::{build_codec, read_input, reject};

/// Arguments for the `notif legacy` subcommand.
#[derive(Args, Debug)]
pub struct LegacyArgs {
    /// Input document; `-` or omitted reads stdin.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Project onto this record version instead of decoding an Action.
    #[arg(long, value_name = "VERSION")]
    pub reader_version: Option<String>,
}

/// Execute the legacy subcommand.
pub fn run_legacy(args: &LegacyArgs, config: &CodecConfig) -> Result<u8> {
    let codec = Arc::new(build_codec(config)?);
    let registry = Arc::new(SchemaRegistry::new(config.resources()));
    let decoder = LegacyDecoder::new(Arc::clone(&registry), Arc::clone(&codec));
    let encoder = LegacyEncoder::new(registry);
    let input = read_input(args.path.as_ref())?;

    let rendered = match &args.reader_version {
        Some(version) => decoder
            .decode_record(&input, version)
            .and_then(|record| encoder.encode_record(&record)),
        None => decoder
            .decode(&input)
            .and_then(|action| codec.encode(&action)),
    };

    match rendered {
        Ok(text) => {
            println!("{text}");
            Ok(0)
        }
        Err(CodecError::Schema(err)) if !matches!(err, SchemaError::RecordMismatch { .. }) => {
            Err(anyhow::Error::new(err).context("legacy projection failed"))
        }
        Err(err) => reject(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_on(document: &str) -> Result<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, document).unwrap();
        let args = LegacyArgs {
            path: Some(path),
            reader_version: None,
        };
        run_legacy(&args, &CodecConfig::default())
    }

    #[test]
    fn test_record_mismatch_is_rejected_input() {
        let document = r#"{"bundle":5,"application":"a","event_type":"e","timestamp":"2021-08-24T16:36:31","account_id":"t","events":[{"payload":"{}"}]}"#;
        assert_eq!(run_on(document).unwrap(), 1);
    }

    #[test]
    fn test_unknown_version_is_operational() {
        let document = r#"{"version":"v9.9.9","bundle":"b","application":"a","event_type":"e","timestamp":"2021-08-24T16:36:31","account_id":"t","events":[{"payload":"{}"}]}"#;
        let err = run_on(document).unwrap_err();
        assert!(format!("{err:#}").contains("v9.9.9"), "{err:#}");
    }

    #[test]
    fn test_valid_record_decodes() {
        let document = r#"{"bundle":"b","application":"a","event_type":"e","timestamp":"2021-08-24T16:36:31","account_id":"t","events":[{"payload":"{\"k\":\"v\"}"}]}"#;
        assert_eq!(run_on(document).unwrap(), 0);
    }
}
