//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! validator:
//!   strictFields: false
//! normalizer:
//!   defaultVolumeSize: 5Gi
//! ```
//!
//! Every key is optional. The `--lenient` flag overrides
//! `validator.strictFields`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use devstate_devfile::Pipeline;
use devstate_schema::{shapes, NormalizerConfig, Validator, ValidatorConfig};

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    pub validator: ValidatorConfig,
    pub normalizer: NormalizerConfig,
}

impl CliConfig {
    /// Load the configuration file at `path`, or the defaults if none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Apply the `--lenient` flag.
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        if lenient {
            self.validator.strict_fields = false;
        }
        self
    }

    /// A validator over the built-in shapes.
    pub fn validator(&self) -> Validator<'static> {
        Validator::new(shapes::shared(), self.validator)
    }

    /// A pipeline over the built-in shapes.
    pub fn pipeline(&self) -> Pipeline<'static> {
        Pipeline::builtin(self.validator, self.normalizer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::load(None).unwrap();
        assert!(config.validator.strict_fields);
        assert_eq!(config.normalizer.default_volume_size, "1Gi");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "normalizer:\n  defaultVolumeSize: 5Gi").unwrap();
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert!(config.validator.strict_fields);
        assert_eq!(config.normalizer.default_volume_size, "5Gi");
    }

    #[test]
    fn test_lenient_flag_overrides_file() {
        let config = CliConfig::default().with_lenient(true);
        assert!(!config.validator.strict_fields);
        assert!(CliConfig::default().with_lenient(false).validator.strict_fields);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/devstate.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read config file"));
    }
}
