//! # Schema Subcommand
//!
//! Inspects the built-in shape registry.

use anyhow::Result;
use clap::{Args, Subcommand};

use devstate_schema::{export_json_schema, shapes};

use crate::config::CliConfig;
use crate::EXIT_OK;

/// Arguments for the `devstate schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// List every registered shape.
    List,
    /// Print one shape as a JSON Schema (draft 2020-12) document.
    Export {
        /// Shape to export.
        shape: String,
    },
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &CliConfig) -> Result<u8> {
    let registry = shapes::shared();
    match &args.command {
        SchemaCommand::List => {
            for name in registry.shape_names() {
                println!("{name}");
            }
        }
        SchemaCommand::Export { shape } => {
            let schema = export_json_schema(registry, shape, config.validator.strict_fields)?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(EXIT_OK)
}
