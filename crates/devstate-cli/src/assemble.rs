//! # Assemble Subcommand
//!
//! Runs a `DevfileContent` document through validation, normalization and
//! assembly, and prints either the assembled devfile or every error found.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use devstate_devfile::{DevfileContent, PipelineError};
use devstate_schema::load_document;

use crate::config::CliConfig;
use crate::{report_failure, OutputFormat, EXIT_OK};

/// Arguments for the `devstate assemble` subcommand.
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// `DevfileContent` document to assemble.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Outcome of loading a devfile: the aggregate, or the exit code of a
/// rejection that has already been reported.
pub(crate) enum Loaded {
    Devfile(DevfileContent),
    Rejected(u8),
}

/// Load and assemble the devfile at `path`, reporting rejections.
pub(crate) fn load_devfile(path: &Path, config: &CliConfig) -> Result<Loaded> {
    let raw = load_document(path)?;
    match config.pipeline().run(&raw) {
        Ok(devfile) => Ok(Loaded::Devfile(devfile)),
        Err(err) => report_pipeline_error(&path.display().to_string(), err).map(Loaded::Rejected),
    }
}

/// Report validation and assembly errors; pass anything else through as an
/// operational error.
pub(crate) fn report_pipeline_error(subject: &str, err: PipelineError) -> Result<u8> {
    match err {
        PipelineError::Validation(errors) => Ok(report_failure(subject, &errors)),
        PipelineError::Assembly(errors) => Ok(report_failure(subject, &errors)),
        PipelineError::Request(error) => Ok(report_failure(subject, [error])),
        other => Err(other.into()),
    }
}

/// Execute the assemble subcommand.
pub fn run_assemble(args: &AssembleArgs, config: &CliConfig) -> Result<u8> {
    match load_devfile(&args.path, config)? {
        Loaded::Devfile(devfile) => {
            tracing::info!(
                name = %devfile.metadata().name,
                containers = devfile.containers().len(),
                commands = devfile.commands().len(),
                "assembled devfile"
            );
            println!("{}", args.output.render(&devfile.to_record()?)?);
            Ok(EXIT_OK)
        }
        Loaded::Rejected(code) => Ok(code),
    }
}
