//! # devstate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use devstate_cli::assemble::{run_assemble, AssembleArgs};
use devstate_cli::config::CliConfig;
use devstate_cli::normalize::{run_normalize, NormalizeArgs};
use devstate_cli::provision::{run_provision, ProvisionArgs};
use devstate_cli::schema::{run_schema, SchemaArgs};
use devstate_cli::validate::{run_validate, ValidateArgs};
use devstate_cli::EXIT_ERROR;

/// devstate CLI
///
/// Validates, normalizes and assembles devfile records: containers, volumes,
/// resources and the devfile aggregate that contains them.
#[derive(Parser, Debug)]
#[command(name = "devstate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Drop unknown fields with a warning instead of rejecting them.
    #[arg(long, global = true)]
    lenient: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a record against a registered shape.
    Validate(ValidateArgs),

    /// Validate a record and print it with every default applied.
    Normalize(NormalizeArgs),

    /// Validate, normalize and assemble a devfile.
    Assemble(AssembleArgs),

    /// Add a volume or resource to a devfile.
    Provision(ProvisionArgs),

    /// List registered shapes or export one as JSON Schema.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr; stdout carries records and reports.
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    tracing::debug!("devstate CLI starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_lenient(cli.lenient),
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Normalize(args) => run_normalize(args, &config),
        Commands::Assemble(args) => run_assemble(args, &config),
        Commands::Provision(args) => run_provision(args, &config),
        Commands::Schema(args) => run_schema(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
