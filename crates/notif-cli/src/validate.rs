//! # Validate Subcommand
//!
//! Strict validation of wire documents. Prints every violation, not only
//! the first, and exits 1 when there are any.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use notif_ingress::{ActionCodec, CodecConfig, CodecError};

use crate::{build_codec, read_input, reject};

/// Arguments for the `notif validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input document; `-` or omitted reads stdin.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Validate against the outbound ActionOut schema.
    #[arg(long)]
    pub action_out: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when valid, 1 on violations, 2 on operational error.
pub fn run_validate(args: &ValidateArgs, config: &CodecConfig) -> Result<u8> {
    let codec = build_codec(config)?;
    let input = read_input(args.path.as_ref())?;
    match validate_document(&codec, &input, args.action_out) {
        Ok(()) => {
            println!("OK");
            Ok(0)
        }
        Err(err) => reject(err),
    }
}

/// Validate `input` as an Action, or as an ActionOut when `action_out` is set.
pub fn validate_document(codec: &ActionCodec, input: &str, action_out: bool) -> Result<(), CodecError> {
    if action_out {
        codec.validate_action_out_json(input)
    } else {
        codec.validate_json(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"bundle":"b","application":"a","event_type":"e","timestamp":"2021-08-24T16:36:31","org_id":"o","events":[{"payload":{}}]}"#;

    #[test]
    fn test_valid_document() {
        let codec = ActionCodec::embedded().unwrap();
        assert!(validate_document(&codec, VALID, false).is_ok());
        assert!(validate_document(&codec, VALID, true).is_ok());
    }

    #[test]
    fn test_source_only_valid_for_action_out() {
        let codec = ActionCodec::embedded().unwrap();
        let with_source = VALID.replacen('{', r#"{"source":{"bundle":{"display_name":"B"}},"#, 1);
        assert!(validate_document(&codec, &with_source, true).is_ok());
        assert!(validate_document(&codec, &with_source, false).unwrap_err().is_validation());
    }
}
