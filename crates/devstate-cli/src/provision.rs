//! # Provision Subcommand
//!
//! Adds a volume or a resource to an existing devfile and prints the
//! updated aggregate. The devfile on disk is not modified.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Args};

use devstate_schema::load_document;

use crate::assemble::{load_devfile, report_pipeline_error, Loaded};
use crate::config::CliConfig;
use crate::{OutputFormat, EXIT_OK};

/// Arguments for the `devstate provision` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("request").required(true).args(["volume", "resource"])))]
pub struct ProvisionArgs {
    /// `DevfileContent` document to extend.
    #[arg(value_name = "PATH")]
    pub devfile: PathBuf,

    /// `VolumePostRequest` document describing the volume to add.
    #[arg(long, value_name = "REQ")]
    pub volume: Option<PathBuf>,

    /// `ResourcePostRequest` document describing the resource to add.
    #[arg(long, value_name = "REQ")]
    pub resource: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Execute the provision subcommand.
pub fn run_provision(args: &ProvisionArgs, config: &CliConfig) -> Result<u8> {
    let devfile = match load_devfile(&args.devfile, config)? {
        Loaded::Devfile(devfile) => devfile,
        Loaded::Rejected(code) => return Ok(code),
    };
    let pipeline = config.pipeline();

    let (request_path, outcome) = match (&args.volume, &args.resource) {
        (Some(path), _) => {
            let raw = load_document(path)?;
            (path, pipeline.provision_volume(&devfile, &raw))
        }
        (None, Some(path)) => {
            let raw = load_document(path)?;
            (path, pipeline.provision_resource(&devfile, &raw))
        }
        (None, None) => anyhow::bail!("one of --volume or --resource is required"),
    };

    match outcome {
        Ok(updated) => {
            println!("{}", args.output.render(&updated.to_record()?)?);
            Ok(EXIT_OK)
        }
        Err(err) => report_pipeline_error(&request_path.display().to_string(), err),
    }
}
