//! # Record Validation
//!
//! Checks a raw JSON record against a registered shape:
//!
//! - every required field is present (`null` counts as absent);
//! - every present value has the declared kind, enum values belong to
//!   their closed set, bounded integers are in range, quantities parse;
//! - exclusive groups have at most one (or exactly one) member set;
//! - unknown fields are rejected in strict mode and dropped in lenient mode.
//!
//! Nested shapes and lists of shapes are checked recursively. Validation
//! never stops at the first problem: all violations are collected, fields
//! in declaration order, then exclusive groups, then unknown fields.
//!
//! Validation is a pure function of the registry, the configuration and
//! the input record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use devstate_core::Quantity;

use crate::error::{ValidationError, ValidationErrors};
use crate::registry::{FieldKind, FieldSpec, FieldSpecs, SchemaRegistry};

/// Validator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Reject unrecognised fields (strict) instead of dropping them (lenient).
    pub strict_fields: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict_fields: true,
        }
    }
}

impl ValidatorConfig {
    pub fn strict() -> Self {
        Self {
            strict_fields: true,
        }
    }

    pub fn lenient() -> Self {
        Self {
            strict_fields: false,
        }
    }
}

/// A record that passed validation against `shape`.
///
/// Only the validator (and the normalizer, whose output is still valid)
/// can construct one. In lenient mode unknown fields have been removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    shape: String,
    value: Value,
}

impl ValidatedRecord {
    pub(crate) fn new(shape: impl Into<String>, value: Value) -> Self {
        Self {
            shape: shape.into(),
            value,
        }
    }

    /// Name of the shape the record conforms to.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// A top-level field of the record.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value.get(field)
    }
}

/// Validates raw records against the shapes of a registry.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    config: ValidatorConfig,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> ValidatorConfig {
        self.config
    }

    /// Validate `raw` against the shape named `shape`.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in a deterministic order. An
    /// unregistered `shape` yields a single [`ValidationError::UnknownShape`].
    pub fn validate(&self, shape: &str, raw: &Value) -> Result<ValidatedRecord, ValidationErrors> {
        let mut errors = Vec::new();
        let cleaned = match self.registry.lookup(shape) {
            Ok(specs) => self.check_object(shape, specs, raw, "", &mut errors),
            Err(_) => {
                errors.push(ValidationError::UnknownShape {
                    shape: shape.to_string(),
                });
                None
            }
        };

        match cleaned {
            Some(value) if errors.is_empty() => {
                tracing::debug!(shape, strict = self.config.strict_fields, "record validated");
                Ok(ValidatedRecord::new(shape, value))
            }
            _ => {
                tracing::debug!(shape, errors = errors.len(), "record rejected");
                Err(ValidationErrors::new(shape, errors))
            }
        }
    }

    /// Check one object against `specs`, returning the cleaned object.
    fn check_object(
        &self,
        shape: &str,
        specs: &FieldSpecs,
        raw: &Value,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        let Some(object) = raw.as_object() else {
            errors.push(ValidationError::NotAnObject {
                shape: shape.to_string(),
                found: json_type(raw),
                path: path.to_string(),
            });
            return None;
        };

        let mut cleaned = Map::new();

        for spec in specs.fields() {
            let field_path = pointer(path, &spec.name);
            match object.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        errors.push(ValidationError::MissingField {
                            shape: shape.to_string(),
                            field: spec.name.clone(),
                            path: field_path,
                        });
                    }
                }
                Some(value) => {
                    if let Some(checked) =
                        self.check_value(shape, spec, &spec.kind, value, &field_path, errors)
                    {
                        cleaned.insert(spec.name.clone(), checked);
                    }
                }
            }
        }

        for group in specs.groups() {
            let set: Vec<String> = group
                .fields
                .iter()
                .filter(|f| object.get(f.as_str()).is_some_and(|v| !v.is_null()))
                .cloned()
                .collect();
            if set.len() > 1 {
                errors.push(ValidationError::ConflictingFields {
                    shape: shape.to_string(),
                    fields: set,
                    path: path.to_string(),
                });
            } else if set.is_empty() && group.require_one {
                errors.push(ValidationError::MissingField {
                    shape: shape.to_string(),
                    field: group.label(),
                    path: path.to_string(),
                });
            }
        }

        for key in object.keys() {
            if specs.get(key).is_some() {
                continue;
            }
            if self.config.strict_fields {
                errors.push(ValidationError::UnknownField {
                    shape: shape.to_string(),
                    field: key.clone(),
                    path: pointer(path, key),
                });
            } else {
                tracing::warn!(shape, field = %key, path = %pointer(path, key), "dropping unknown field");
            }
        }

        Some(Value::Object(cleaned))
    }

    /// Check one present value of kind `kind` belonging to field `spec`.
    fn check_value(
        &self,
        shape: &str,
        spec: &FieldSpec,
        kind: &FieldKind,
        value: &Value,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        let mismatch = |errors: &mut Vec<ValidationError>| {
            errors.push(ValidationError::TypeMismatch {
                shape: shape.to_string(),
                field: spec.name.clone(),
                expected: kind.to_string(),
                found: json_type(value),
                path: path.to_string(),
            });
            None
        };

        match kind {
            FieldKind::String => match value {
                Value::String(_) => Some(value.clone()),
                _ => mismatch(errors),
            },
            FieldKind::Bool => match value {
                Value::Bool(_) => Some(value.clone()),
                _ => mismatch(errors),
            },
            FieldKind::Integer { min, max } => {
                let Some(n) = value.as_i64() else {
                    if value.is_u64() {
                        errors.push(ValidationError::OutOfRange {
                            shape: shape.to_string(),
                            field: spec.name.clone(),
                            value: value.to_string(),
                            path: path.to_string(),
                        });
                        return None;
                    }
                    return mismatch(errors);
                };
                if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                    errors.push(ValidationError::OutOfRange {
                        shape: shape.to_string(),
                        field: spec.name.clone(),
                        value: n.to_string(),
                        path: path.to_string(),
                    });
                    return None;
                }
                Some(value.clone())
            }
            FieldKind::Quantity => {
                let Some(text) = value.as_str() else {
                    return mismatch(errors);
                };
                match Quantity::parse_optional(text) {
                    Ok(_) => Some(value.clone()),
                    Err(reason) => {
                        errors.push(ValidationError::InvalidQuantity {
                            shape: shape.to_string(),
                            field: spec.name.clone(),
                            value: text.to_string(),
                            reason,
                            path: path.to_string(),
                        });
                        None
                    }
                }
            }
            FieldKind::Enum(allowed) => {
                let Some(text) = value.as_str() else {
                    return mismatch(errors);
                };
                if allowed.iter().any(|a| a == text) {
                    Some(value.clone())
                } else {
                    errors.push(ValidationError::InvalidEnumValue {
                        shape: shape.to_string(),
                        field: spec.name.clone(),
                        value: text.to_string(),
                        allowed: allowed.clone(),
                        path: path.to_string(),
                    });
                    None
                }
            }
            FieldKind::Shape(nested) => {
                if !value.is_object() {
                    return mismatch(errors);
                }
                match self.registry.lookup(nested) {
                    Ok(specs) => self.check_object(nested, specs, value, path, errors),
                    Err(_) => {
                        errors.push(ValidationError::UnknownShape {
                            shape: nested.clone(),
                        });
                        None
                    }
                }
            }
            FieldKind::List(inner) => {
                let Some(items) = value.as_array() else {
                    return mismatch(errors);
                };
                let checked: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        self.check_value(shape, spec, inner, item, &pointer(path, &i.to_string()), errors)
                    })
                    .collect();
                (checked.len() == items.len()).then_some(Value::Array(checked))
            }
            FieldKind::StringMap => {
                let Some(entries) = value.as_object() else {
                    return mismatch(errors);
                };
                let mut ok = true;
                for (key, entry) in entries {
                    if !entry.is_string() {
                        ok = false;
                        errors.push(ValidationError::TypeMismatch {
                            shape: shape.to_string(),
                            field: spec.name.clone(),
                            expected: "string".to_string(),
                            found: json_type(entry),
                            path: pointer(path, key),
                        });
                    }
                }
                ok.then(|| value.clone())
            }
        }
    }
}

/// Append `segment` to a JSON Pointer, escaping `~` and `/`.
pub(crate) fn pointer(base: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
}

/// Name of the JSON type of `value`, for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldKind, FieldSpec, FieldSpecs};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "Mount",
                FieldSpecs::new()
                    .field(FieldSpec::required("name", FieldKind::String))
                    .field(FieldSpec::optional("path", FieldKind::String)),
            )
            .unwrap();
        registry
            .register(
                "Box",
                FieldSpecs::new()
                    .field(FieldSpec::required("name", FieldKind::String))
                    .field(FieldSpec::optional("port", FieldKind::integer_in(1, 65535)))
                    .field(FieldSpec::optional("memory", FieldKind::Quantity))
                    .field(FieldSpec::optional(
                        "policy",
                        FieldKind::enumeration(&["never", "undefined", "always"]),
                    ))
                    .field(FieldSpec::optional("mounts", FieldKind::list_of("Mount")))
                    .field(FieldSpec::optional("labels", FieldKind::StringMap))
                    .field(FieldSpec::optional("inlined", FieldKind::String))
                    .field(FieldSpec::optional("uri", FieldKind::String))
                    .exactly_one_of(&["inlined", "uri"]),
            )
            .unwrap();
        registry
    }

    fn validate(raw: Value, config: ValidatorConfig) -> Result<ValidatedRecord, ValidationErrors> {
        let registry = registry();
        Validator::new(&registry, config).validate("Box", &raw)
    }

    #[test]
    fn test_valid_record_passes() {
        let record = validate(
            json!({
                "name": "a",
                "port": 8080,
                "memory": "512Mi",
                "policy": "always",
                "mounts": [{"name": "cache", "path": "/cache"}],
                "labels": {"tier": "dev"},
                "uri": "https://example.com"
            }),
            ValidatorConfig::strict(),
        )
        .unwrap();
        assert_eq!(record.shape(), "Box");
        assert_eq!(record.get("port"), Some(&json!(8080)));
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validate(json!({"uri": "x"}), ValidatorConfig::strict()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.errors()[0],
            ValidationError::MissingField {
                shape: "Box".into(),
                field: "name".into(),
                path: "/name".into(),
            }
        );
    }

    #[test]
    fn test_null_counts_as_absent() {
        let errors = validate(json!({"name": null, "uri": "x"}), ValidatorConfig::strict()).unwrap_err();
        assert!(matches!(&errors.errors()[0], ValidationError::MissingField { field, .. } if field == "name"));
    }

    #[test]
    fn test_conflicting_and_missing_group() {
        let both = validate(json!({"name": "a", "inlined": "k", "uri": "u"}), ValidatorConfig::strict())
            .unwrap_err();
        assert!(matches!(
            &both.errors()[0],
            ValidationError::ConflictingFields { fields, .. } if fields == &["inlined", "uri"]
        ));

        let neither = validate(json!({"name": "a"}), ValidatorConfig::strict()).unwrap_err();
        assert!(matches!(
            &neither.errors()[0],
            ValidationError::MissingField { field, path, .. } if field == "inlined|uri" && path.is_empty()
        ));
    }

    #[test]
    fn test_invalid_enum_value() {
        let errors = validate(json!({"name": "a", "uri": "u", "policy": "sometimes"}), ValidatorConfig::strict())
            .unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::InvalidEnumValue { value, path, .. } if value == "sometimes" && path == "/policy"
        ));
    }

    #[test]
    fn test_unknown_field_strict_vs_lenient() {
        let raw = json!({"name": "a", "uri": "u", "colour": "blue"});
        let errors = validate(raw.clone(), ValidatorConfig::strict()).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::UnknownField { field, .. } if field == "colour"
        ));

        let record = validate(raw, ValidatorConfig::lenient()).unwrap();
        assert_eq!(record.get("colour"), None);
        assert_eq!(record.get("name"), Some(&json!("a")));
    }

    #[test]
    fn test_nested_errors_carry_paths() {
        let errors = validate(
            json!({"name": "a", "uri": "u", "mounts": [{"name": "ok"}, {"path": "/x"}, 7]}),
            ValidatorConfig::strict(),
        )
        .unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["/mounts/1/name", "/mounts/2"]);
    }

    #[test]
    fn test_type_range_and_quantity_errors() {
        let errors = validate(
            json!({
                "name": 5,
                "uri": "u",
                "port": 70000,
                "memory": "lots",
                "labels": {"tier": 1}
            }),
            ValidatorConfig::strict(),
        )
        .unwrap_err();
        let kinds: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                ValidationError::TypeMismatch { .. } => "type",
                ValidationError::OutOfRange { .. } => "range",
                ValidationError::InvalidQuantity { .. } => "quantity",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["type", "range", "quantity", "type"]);
    }

    #[test]
    fn test_empty_quantity_is_unset() {
        assert!(validate(json!({"name": "a", "uri": "u", "memory": ""}), ValidatorConfig::strict()).is_ok());
    }

    #[test]
    fn test_non_object_and_unknown_shape() {
        let errors = validate(json!([1, 2]), ValidatorConfig::strict()).unwrap_err();
        assert!(matches!(&errors.errors()[0], ValidationError::NotAnObject { found: "array", .. }));

        let registry = registry();
        let errors = Validator::new(&registry, ValidatorConfig::default())
            .validate("Nope", &json!({}))
            .unwrap_err();
        assert!(matches!(&errors.errors()[0], ValidationError::UnknownShape { .. }));
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(pointer("", "a/b"), "/a~1b");
        assert_eq!(pointer("/x", "m~n"), "/x/m~0n");
    }

    #[test]
    fn test_config_wire_format() {
        let config: ValidatorConfig = serde_json::from_value(json!({"strictFields": false})).unwrap();
        assert_eq!(config, ValidatorConfig::lenient());
        let defaulted: ValidatorConfig = serde_json::from_value(json!({})).unwrap();
        assert!(defaulted.strict_fields);
    }
}
