//! # Normalize Subcommand
//!
//! Validates a document and prints it with every default applied.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use devstate_devfile::PipelineError;
use devstate_schema::{load_document, shapes};

use crate::config::CliConfig;
use crate::validate::ensure_shape;
use crate::{report_failure, OutputFormat, EXIT_OK};

/// Arguments for the `devstate normalize` subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Shape of the document (see `devstate schema list`).
    #[arg(long, default_value = shapes::DEVFILE_CONTENT)]
    pub shape: String,

    /// Document to normalize.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Execute the normalize subcommand.
pub fn run_normalize(args: &NormalizeArgs, config: &CliConfig) -> Result<u8> {
    ensure_shape(&args.shape)?;
    let raw = load_document(&args.path)?;

    match config.pipeline().prepare(&args.shape, &raw) {
        Ok(record) => {
            println!("{}", args.output.render(record.as_value())?);
            Ok(EXIT_OK)
        }
        Err(PipelineError::Validation(errors)) => {
            Ok(report_failure(&args.path.display().to_string(), &errors))
        }
        Err(other) => Err(other.into()),
    }
}
