//! # notif CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notif_cli::decode::{run_decode, DecodeArgs};
use notif_cli::legacy::{run_legacy, LegacyArgs};
use notif_cli::validate::{run_validate, ValidateArgs};
use notif_cli::version::{run_version, VersionArgs};

/// Notification Action codec tooling.
///
/// Decodes producer input, validates canonical and outbound documents, and
/// projects legacy version-tagged records.
#[derive(Parser, Debug)]
#[command(name = "notif", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a codec configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read schemas from this directory instead of the built-in set.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode an Action and print its canonical encoding.
    Decode(DecodeArgs),

    /// Validate an Action (or ActionOut) document strictly.
    Validate(ValidateArgs),

    /// Project a version-tagged legacy record.
    Legacy(LegacyArgs),

    /// Print the version tag of a document.
    Version(VersionArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = notif_cli::load_config(cli.config.as_deref(), cli.schema_dir.as_deref())
        .and_then(|config| match &cli.command {
            Commands::Decode(args) => run_decode(args, &config),
            Commands::Validate(args) => run_validate(args, &config),
            Commands::Legacy(args) => run_legacy(args, &config),
            Commands::Version(args) => run_version(args),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
