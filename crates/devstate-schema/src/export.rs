//! # JSON Schema Export
//!
//! Renders a registered shape as a JSON Schema (Draft 2020-12) document so
//! that clients outside this workspace can validate payloads the same way.
//! Nested shapes reachable from the exported one are emitted under `$defs`
//! and referenced with `$ref`.
//!
//! Null handling differs slightly: the validator treats a `null` value as
//! an absent field, while the exported schema rejects it by type.

use std::collections::{BTreeMap, VecDeque};

use serde_json::{json, Map, Value};

use crate::error::RegistryError;
use crate::registry::{FieldKind, FieldSpecs, SchemaRegistry};

/// Draft identifier written to `$schema`.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Pattern of a quantity string; the empty string means unset.
pub const QUANTITY_PATTERN: &str =
    r"^(([0-9]+(\.[0-9]*)?|\.[0-9]+)([KMGTPE]i|[mkMGTPE]|[eE][0-9]+)?)?$";

/// Export `shape` as a standalone JSON Schema document.
///
/// In strict mode every object schema forbids properties the shape does
/// not declare.
///
/// # Errors
///
/// Returns [`RegistryError::ShapeNotFound`] if `shape`, or any shape it
/// refers to, is not registered.
pub fn export_json_schema(
    registry: &SchemaRegistry,
    shape: &str,
    strict: bool,
) -> Result<Value, RegistryError> {
    let root = registry.lookup(shape)?;

    let mut defs = BTreeMap::new();
    let mut queue: VecDeque<&str> = referenced_shapes(root).collect();
    while let Some(name) = queue.pop_front() {
        if name == shape || defs.contains_key(name) {
            continue;
        }
        let specs = registry.lookup(name)?;
        defs.insert(name.to_string(), object_schema(specs, shape, strict));
        queue.extend(referenced_shapes(specs));
    }

    let mut document = Map::new();
    document.insert("$schema".into(), json!(SCHEMA_DIALECT));
    document.insert("title".into(), json!(shape));
    if let Value::Object(body) = object_schema(root, shape, strict) {
        document.extend(body);
    }
    if !defs.is_empty() {
        document.insert("$defs".into(), Value::Object(defs.into_iter().collect()));
    }

    tracing::debug!(shape, strict, "exported JSON schema");
    Ok(Value::Object(document))
}

fn referenced_shapes(specs: &FieldSpecs) -> impl Iterator<Item = &str> {
    specs.fields().iter().filter_map(|f| f.kind.referenced_shape())
}

fn object_schema(specs: &FieldSpecs, root: &str, strict: bool) -> Value {
    let properties: Map<String, Value> = specs
        .fields()
        .iter()
        .map(|f| (f.name.clone(), kind_schema(&f.kind, root)))
        .collect();
    let required: Vec<&str> = specs.required_fields().collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    if strict {
        schema.insert("additionalProperties".into(), json!(false));
    }

    let mut constraints = Vec::new();
    for group in specs.groups() {
        if group.require_one {
            let branches: Vec<Value> = group
                .fields
                .iter()
                .map(|f| json!({ "required": [f] }))
                .collect();
            constraints.push(json!({ "oneOf": branches }));
        } else {
            for (i, a) in group.fields.iter().enumerate() {
                for b in &group.fields[i + 1..] {
                    constraints.push(json!({ "not": { "required": [a, b] } }));
                }
            }
        }
    }
    if !constraints.is_empty() {
        schema.insert("allOf".into(), Value::Array(constraints));
    }

    Value::Object(schema)
}

fn kind_schema(kind: &FieldKind, root: &str) -> Value {
    match kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Bool => json!({ "type": "boolean" }),
        FieldKind::Integer { min, max } => {
            let mut schema = Map::new();
            schema.insert("type".into(), json!("integer"));
            if let Some(min) = min {
                schema.insert("minimum".into(), json!(min));
            }
            if let Some(max) = max {
                schema.insert("maximum".into(), json!(max));
            }
            Value::Object(schema)
        }
        FieldKind::Quantity => json!({ "type": "string", "pattern": QUANTITY_PATTERN }),
        FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldKind::Shape(name) if name == root => json!({ "$ref": "#" }),
        FieldKind::Shape(name) => json!({ "$ref": format!("#/$defs/{name}") }),
        FieldKind::List(inner) => json!({ "type": "array", "items": kind_schema(inner, root) }),
        FieldKind::StringMap => json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }),
    }
}
