//! # Decode Subcommand
//!
//! Decodes producer input under the decode profile and prints the strict
//! canonical encoding. Useful for normalizing captured payloads.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use notif_ingress::{ActionCodec, CodecError, CodecConfig};

use crate::{build_codec, read_input, reject};

/// Arguments for the `notif decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input document; `-` or omitted reads stdin.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Execute the decode subcommand.
pub fn run_decode(args: &DecodeArgs, config: &CodecConfig) -> Result<u8> {
    let codec = build_codec(config)?;
    let input = read_input(args.path.as_ref())?;
    match canonicalize(&codec, &input) {
        Ok(encoded) => {
            println!("{encoded}");
            Ok(0)
        }
        Err(err) => reject(err),
    }
}

/// Decode `input` and re-encode it canonically.
pub fn canonicalize(codec: &ActionCodec, input: &str) -> Result<String, CodecError> {
    let action = codec.decode(input)?;
    codec.encode(&action)
}
