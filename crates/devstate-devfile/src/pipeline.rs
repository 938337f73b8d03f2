//! # Pipeline
//!
//! The end-to-end path from a raw record to a typed result:
//!
//! ```text
//! raw ─▶ validate ─▶ normalize ─▶ decode ─▶ assemble / provision
//! ```
//!
//! Each stage either hands a stronger value to the next or stops with a
//! typed rejection ([`PipelineError`]).

use serde::de::DeserializeOwned;
use serde_json::Value;

use devstate_core::{DevfileParts, ResourcePostRequest, VolumePostRequest};
use devstate_schema::shapes::{self, DEVFILE_CONTENT, RESOURCE_POST_REQUEST, VOLUME_POST_REQUEST};
use devstate_schema::{
    NormalizedRecord, Normalizer, NormalizerConfig, SchemaRegistry, Validator, ValidatorConfig,
};

use crate::assemble::assemble_parts;
use crate::content::DevfileContent;
use crate::error::PipelineError;
use crate::provision::{provision_resource, provision_volume};

/// Validator and normalizer bound to one registry.
#[derive(Debug, Clone)]
pub struct Pipeline<'r> {
    validator: Validator<'r>,
    normalizer: Normalizer<'r>,
}

impl<'r> Pipeline<'r> {
    pub fn new(
        registry: &'r SchemaRegistry,
        validator: ValidatorConfig,
        normalizer: NormalizerConfig,
    ) -> Self {
        Self {
            validator: Validator::new(registry, validator),
            normalizer: Normalizer::new(registry, normalizer),
        }
    }

    pub fn validator(&self) -> &Validator<'r> {
        &self.validator
    }

    pub fn normalizer(&self) -> &Normalizer<'r> {
        &self.normalizer
    }

    /// Validate and normalize `raw` as a record of `shape`.
    pub fn prepare(&self, shape: &str, raw: &Value) -> Result<NormalizedRecord, PipelineError> {
        let record = self.validator.validate(shape, raw)?;
        Ok(self.normalizer.normalize(&record))
    }

    /// Validate, normalize and decode `raw` into the typed model.
    pub fn decode<T: DeserializeOwned>(&self, shape: &str, raw: &Value) -> Result<T, PipelineError> {
        self.prepare(shape, raw)?
            .decode()
            .map_err(|source| PipelineError::Decode {
                shape: shape.to_string(),
                source,
            })
    }

    /// Turn a raw `DevfileContent` record into an assembled devfile.
    pub fn run(&self, raw: &Value) -> Result<DevfileContent, PipelineError> {
        let parts: DevfileParts = self.decode(DEVFILE_CONTENT, raw)?;
        Ok(assemble_parts(parts)?)
    }

    /// Add the volume described by a raw `VolumePostRequest` to `devfile`.
    pub fn provision_volume(
        &self,
        devfile: &DevfileContent,
        raw: &Value,
    ) -> Result<DevfileContent, PipelineError> {
        let request: VolumePostRequest = self.decode(VOLUME_POST_REQUEST, raw)?;
        Ok(provision_volume(devfile, request)?)
    }

    /// Add the resource described by a raw `ResourcePostRequest` to `devfile`.
    pub fn provision_resource(
        &self,
        devfile: &DevfileContent,
        raw: &Value,
    ) -> Result<DevfileContent, PipelineError> {
        let request: ResourcePostRequest = self.decode(RESOURCE_POST_REQUEST, raw)?;
        Ok(provision_resource(devfile, request)?)
    }
}

impl Pipeline<'static> {
    /// A pipeline over the built-in shapes.
    pub fn builtin(validator: ValidatorConfig, normalizer: NormalizerConfig) -> Self {
        Self::new(shapes::shared(), validator, normalizer)
    }
}

impl Default for Pipeline<'static> {
    fn default() -> Self {
        Self::builtin(ValidatorConfig::default(), NormalizerConfig::default())
    }
}
