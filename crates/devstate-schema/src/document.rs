//! # Document Loading
//!
//! Reads raw records from JSON or YAML documents. YAML is converted into
//! the equivalent `serde_json::Value` tree so the validator only ever sees
//! one representation.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Infer the format from a file extension: `.yaml`/`.yml` are YAML,
    /// anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Errors raised while loading a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}

/// Load a raw record from `path`, choosing the format by extension.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "loading document");
    parse_document(&text, format)
}

/// Parse a raw record from text in the given format.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, DocumentError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
            yaml_to_json_value(&yaml).map_err(DocumentError::Conversion)
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Devfile documents only use the JSON-compatible subset of YAML; tags are
/// ignored and scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
