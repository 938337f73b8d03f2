//! # Validate Subcommand
//!
//! Checks a JSON or YAML document against one registered shape and prints
//! every violation found.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use devstate_schema::{load_document, shapes};

use crate::config::CliConfig;
use crate::{report_failure, EXIT_OK};

/// Arguments for the `devstate validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Shape to validate against (see `devstate schema list`).
    #[arg(long, default_value = shapes::DEVFILE_CONTENT)]
    pub shape: String,

    /// Document to validate (`.json`, `.yaml` or `.yml`).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Fail with an operational error if `shape` is not registered.
pub(crate) fn ensure_shape(shape: &str) -> Result<()> {
    let registry = shapes::shared();
    if !registry.contains(shape) {
        bail!(
            "unknown shape '{shape}' (expected one of: {})",
            registry.shape_names().join(", ")
        );
    }
    Ok(())
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the document is valid, 1 if it is rejected.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    ensure_shape(&args.shape)?;
    let raw = load_document(&args.path)?;

    match config.validator().validate(&args.shape, &raw) {
        Ok(_) => {
            println!("OK: {} is a valid {}", args.path.display(), args.shape);
            Ok(EXIT_OK)
        }
        Err(errors) => Ok(report_failure(&args.path.display().to_string(), &errors)),
    }
}
