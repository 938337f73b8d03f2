//! # devstate-cli: CLI Tool for devstate
//!
//! Provides the `devstate` command-line interface over the schema registry,
//! the validator/normalizer and the devfile assembler.
//!
//! ## Subcommands
//!
//! - `devstate validate`: Check a record against a registered shape.
//! - `devstate normalize`: Validate a record and print it with defaults applied.
//! - `devstate assemble`: Run a `DevfileContent` record through the full pipeline.
//! - `devstate provision`: Add a volume or resource to a devfile.
//! - `devstate schema`: List registered shapes or export one as JSON Schema.
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the input is rejected (validation or assembly
//! errors, all of which are printed), `2` on operational errors such as an
//! unreadable file.

pub mod assemble;
pub mod config;
pub mod normalize;
pub mod provision;
pub mod schema;
pub mod validate;

use std::fmt::Display;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Exit code for success.
pub const EXIT_OK: u8 = 0;
/// Exit code for rejected input.
pub const EXIT_REJECTED: u8 = 1;
/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 2;

/// Serialization format for printed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).context("failed to render JSON"),
            Self::Yaml => serde_yaml::to_string(value).context("failed to render YAML"),
        }
    }
}

/// Print a rejection: a `FAIL` header followed by one line per error.
pub fn report_failure<E: Display>(subject: &str, errors: impl IntoIterator<Item = E>) -> u8 {
    let lines: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
    println!("FAIL: {subject} ({} error(s))", lines.len());
    for line in &lines {
        println!("  {line}");
    }
    EXIT_REJECTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_formats() {
        let value = json!({"name": "cache", "size": "1Gi"});
        let rendered = OutputFormat::Json.render(&value).unwrap();
        assert!(rendered.contains("\"size\": \"1Gi\""));
        let rendered = OutputFormat::Yaml.render(&value).unwrap();
        assert!(rendered.contains("size: 1Gi"));
    }

    #[test]
    fn test_report_failure_returns_rejected() {
        assert_eq!(report_failure("x.json", ["a", "b"]), EXIT_REJECTED);
    }
}
