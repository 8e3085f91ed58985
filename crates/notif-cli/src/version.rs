//! # Version Subcommand
//!
//! Prints the `version` tag of a wire document, as the legacy record path
//! would resolve it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use notif_ingress::read_version;

use crate::{read_input, reject};

/// Arguments for the `notif version` subcommand.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Input document; `-` or omitted reads stdin.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Execute the version subcommand.
pub fn run_version(args: &VersionArgs) -> Result<u8> {
    let input = read_input(args.path.as_ref())?;
    match read_version(&input) {
        Ok(version) => {
            println!("{version}");
            Ok(0)
        }
        Err(err) => reject(err),
    }
}
