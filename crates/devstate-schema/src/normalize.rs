//! # Record Normalization
//!
//! Fills defaults on a [`ValidatedRecord`] so downstream consumers never
//! see an absent optional field:
//!
//! - optional fields with a literal default take it;
//! - volume sizes take the configured default size;
//! - unset sequence fields become `[]` and unset map fields `{}`;
//! - nested records and lists of records are normalized recursively;
//! - a missing name on a provisioning request is derived from the content
//!   of the rest of the record (applied last, after every other default).
//!
//! Normalization never fails, and is idempotent: a normalized record has
//! every defaultable field set, so a second pass changes nothing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::registry::{FieldDefault, FieldKind, FieldSpecs, SchemaRegistry};
use crate::validate::ValidatedRecord;

/// Number of hex characters of the digest kept in a derived name.
const DERIVED_NAME_HEX_LEN: usize = 8;

/// Normalizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizerConfig {
    /// Size given to volumes that do not declare one.
    pub default_volume_size: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_volume_size: "1Gi".to_string(),
        }
    }
}

/// A validated record with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    shape: String,
    value: Value,
}

impl NormalizedRecord {
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value.get(field)
    }

    /// Decode into the typed model.
    ///
    /// # Errors
    ///
    /// Fails only if `T` does not correspond to the record's shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

/// A normalized record is still valid, so it can be fed back through
/// the normalizer.
impl From<NormalizedRecord> for ValidatedRecord {
    fn from(record: NormalizedRecord) -> Self {
        ValidatedRecord::new(record.shape, record.value)
    }
}

/// Applies defaults to validated records.
#[derive(Debug, Clone)]
pub struct Normalizer<'r> {
    registry: &'r SchemaRegistry,
    config: NormalizerConfig,
}

impl<'r> Normalizer<'r> {
    pub fn new(registry: &'r SchemaRegistry, config: NormalizerConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a validated record of the shape it was validated against.
    pub fn normalize(&self, record: &ValidatedRecord) -> NormalizedRecord {
        let value = self.normalize_shape(record.shape(), record.as_value());
        tracing::debug!(shape = record.shape(), "record normalized");
        NormalizedRecord {
            shape: record.shape().to_string(),
            value,
        }
    }

    fn normalize_shape(&self, shape: &str, value: &Value) -> Value {
        match (self.registry.lookup(shape), value.as_object()) {
            (Ok(specs), Some(object)) => Value::Object(self.normalize_object(specs, object)),
            _ => value.clone(),
        }
    }

    fn normalize_object(&self, specs: &FieldSpecs, object: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        let mut derived = Vec::new();

        for spec in specs.fields() {
            match object.get(&spec.name) {
                Some(value) if !value.is_null() => {
                    out.insert(spec.name.clone(), self.normalize_value(&spec.kind, value));
                }
                _ => match &spec.default {
                    Some(FieldDefault::Literal(value)) => {
                        tracing::trace!(field = %spec.name, "literal default");
                        out.insert(spec.name.clone(), value.clone());
                    }
                    Some(FieldDefault::VolumeSize) => {
                        tracing::trace!(field = %spec.name, size = %self.config.default_volume_size, "volume size default");
                        out.insert(
                            spec.name.clone(),
                            Value::String(self.config.default_volume_size.clone()),
                        );
                    }
                    Some(FieldDefault::DerivedName { prefix }) => {
                        derived.push((spec.name.clone(), prefix.clone()));
                    }
                    None => match spec.kind {
                        FieldKind::List(_) => {
                            out.insert(spec.name.clone(), Value::Array(Vec::new()));
                        }
                        FieldKind::StringMap => {
                            out.insert(spec.name.clone(), Value::Object(Map::new()));
                        }
                        _ => {}
                    },
                },
            }
        }

        for (field, prefix) in derived {
            let name = derive_name(&prefix, &Value::Object(out.clone()));
            tracing::trace!(field = %field, name = %name, "derived name");
            out.insert(field, Value::String(name));
        }

        out
    }

    fn normalize_value(&self, kind: &FieldKind, value: &Value) -> Value {
        match (kind, value) {
            (FieldKind::Shape(nested), _) => self.normalize_shape(nested, value),
            (FieldKind::List(inner), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| self.normalize_value(inner, item))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }
}

/// Derive a default name from the canonical JSON of `content`:
/// `"<prefix>-<first 8 hex chars of sha256>"`.
pub fn derive_name(prefix: &str, content: &Value) -> String {
    let bytes = serde_jcs::to_vec(content).unwrap_or_else(|_| content.to_string().into_bytes());
    let hash = Sha256::digest(&bytes);
    let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
    format!("{prefix}-{}", &hex[..DERIVED_NAME_HEX_LEN])
}
