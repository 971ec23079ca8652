//! # jsonform CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers in `jsonform_cli`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsonform_cli::check::{run_check, CheckArgs};
use jsonform_cli::inspect::{run_inspect, InspectArgs};
use jsonform_cli::load::load_config;

/// Compile JSON Schemas into form Field Models and check data against them.
#[derive(Parser, Debug)]
#[command(name = "jsonform", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Form configuration file (YAML). Defaults to JSONFORM_* environment
    /// variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a schema and print the field tree.
    Inspect(InspectArgs),

    /// Validate a data document against a schema.
    Check(CheckArgs),
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
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("jsonform CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Check(args) => run_check(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
