//! # Schema Registry
//!
//! Holds the set of known record shapes and the constraints on each of
//! their fields. A shape is a named list of [`FieldSpec`]s plus any
//! exclusive field groups ("at most one of" / "exactly one of").
//!
//! The registry is populated once at startup and read concurrently
//! afterwards: it is plain owned data, `Send + Sync`, with no interior
//! mutability.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::RegistryError;

/// The kind of value a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    /// An integer, optionally bounded (inclusive).
    Integer { min: Option<i64>, max: Option<i64> },
    /// A resource quantity string such as `"512Mi"`; empty means unset.
    Quantity,
    /// A string drawn from a closed set of literals.
    Enum(Vec<String>),
    /// A nested record of another registered shape.
    Shape(String),
    List(Box<FieldKind>),
    /// An object whose values are all strings.
    StringMap,
}

impl FieldKind {
    /// A closed enum over `values`.
    pub fn enumeration(values: &[&str]) -> Self {
        Self::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// A nested record of shape `name`.
    pub fn shape(name: impl Into<String>) -> Self {
        Self::Shape(name.into())
    }

    /// A list of `inner`.
    pub fn list(inner: FieldKind) -> Self {
        Self::List(Box::new(inner))
    }

    /// A list of nested records of shape `name`.
    pub fn list_of(name: impl Into<String>) -> Self {
        Self::List(Box::new(Self::Shape(name.into())))
    }

    /// An integer in `min..=max`.
    pub fn integer_in(min: i64, max: i64) -> Self {
        Self::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Shape names this kind refers to, directly or through lists.
    pub fn referenced_shape(&self) -> Option<&str> {
        match self {
            Self::Shape(name) => Some(name),
            Self::List(inner) => inner.referenced_shape(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("boolean"),
            Self::Integer { .. } => f.write_str("integer"),
            Self::Quantity => f.write_str("quantity string"),
            Self::Enum(values) => write!(f, "one of [{}]", values.join(", ")),
            Self::Shape(name) => write!(f, "{name} object"),
            Self::List(inner) => write!(f, "array of {inner}"),
            Self::StringMap => f.write_str("map of strings"),
        }
    }
}

/// Default applied by the normalizer when an optional field is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDefault {
    /// A fixed value.
    Literal(Value),
    /// The configured default volume size.
    VolumeSize,
    /// A name derived from the digest of the rest of the record,
    /// `"<prefix>-<8 hex chars>"`.
    DerivedName { prefix: String },
}

/// Constraints on one field of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub kind: FieldKind,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    /// A field that must be present.
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: true,
            kind,
            default: None,
        }
    }

    /// A field that may be absent.
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind,
            default: None,
        }
    }

    /// Set the default used when the field is absent.
    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Set a literal default.
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.with_default(FieldDefault::Literal(value.into()))
    }
}

/// A group of mutually exclusive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup {
    pub fields: Vec<String>,
    /// When true exactly one member must be set; otherwise at most one.
    pub require_one: bool,
}

impl ExclusiveGroup {
    /// Display label naming the group, e.g. `inlined|uri`.
    pub fn label(&self) -> String {
        self.fields.join("|")
    }
}

/// The field constraints of one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpecs {
    fields: Vec<FieldSpec>,
    groups: Vec<ExclusiveGroup>,
}

impl FieldSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Require exactly one of `fields` to be set.
    pub fn exactly_one_of(mut self, fields: &[&str]) -> Self {
        self.groups.push(ExclusiveGroup {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            require_one: true,
        });
        self
    }

    /// Allow at most one of `fields` to be set.
    pub fn at_most_one_of(mut self, fields: &[&str]) -> Self {
        self.groups.push(ExclusiveGroup {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            require_one: false,
        });
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn groups(&self) -> &[ExclusiveGroup] {
        &self.groups
    }

    /// Look up a field by wire name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}

/// Registry of record shapes, keyed by shape name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    shapes: BTreeMap<String, FieldSpecs>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateShape`] if `name` is already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        specs: FieldSpecs,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.shapes.contains_key(&name) {
            return Err(RegistryError::DuplicateShape { shape: name });
        }
        tracing::debug!(
            shape = %name,
            fields = specs.fields.len(),
            groups = specs.groups.len(),
            "registered shape"
        );
        self.shapes.insert(name, specs);
        Ok(())
    }

    /// Insert without the duplicate check, for catalogues whose names are
    /// distinct by construction.
    pub(crate) fn insert_unchecked(&mut self, name: &str, specs: FieldSpecs) {
        self.shapes.insert(name.to_string(), specs);
    }

    /// Look up the field specs of a shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ShapeNotFound`] if no shape is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&FieldSpecs, RegistryError> {
        self.shapes
            .get(name)
            .ok_or_else(|| RegistryError::ShapeNotFound {
                shape: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Registered shape names, sorted.
    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.keys().map(|s| s.as_str()).collect()
    }

    /// Check that the registry is internally consistent: every nested
    /// shape reference resolves, and every exclusive group names optional
    /// fields declared on its shape.
    pub fn verify(&self) -> Result<(), RegistryError> {
        for (shape, specs) in &self.shapes {
            for field in &specs.fields {
                if let Some(target) = field.kind.referenced_shape() {
                    if !self.shapes.contains_key(target) {
                        return Err(RegistryError::DanglingShapeReference {
                            shape: shape.clone(),
                            field: field.name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
            for group in &specs.groups {
                for member in &group.fields {
                    match specs.get(member) {
                        Some(spec) if !spec.required => {}
                        _ => {
                            return Err(RegistryError::InvalidGroup {
                                shape: shape.clone(),
                                field: member.clone(),
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_specs() -> FieldSpecs {
        FieldSpecs::new()
            .field(FieldSpec::required("name", FieldKind::String))
            .field(FieldSpec::optional("size", FieldKind::Quantity))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register("Volume", volume_specs()).unwrap();
        let specs = registry.lookup("Volume").unwrap();
        assert_eq!(specs.fields().len(), 2);
        assert!(specs.get("name").unwrap().required);
        assert_eq!(specs.required_fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_duplicate_shape_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register("Volume", volume_specs()).unwrap();
        let err = registry.register("Volume", FieldSpecs::new()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateShape { ref shape } if shape == "Volume"));
        // The original registration is untouched.
        assert_eq!(registry.lookup("Volume").unwrap().fields().len(), 2);
    }

    #[test]
    fn test_lookup_missing_shape() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.lookup("Nope"),
            Err(RegistryError::ShapeNotFound { .. })
        ));
    }

    #[test]
    fn test_verify_detects_dangling_reference() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "Container",
                FieldSpecs::new().field(FieldSpec::required(
                    "volumeMounts",
                    FieldKind::list_of("VolumeMount"),
                )),
            )
            .unwrap();
        let err = registry.verify().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DanglingShapeReference { ref target, .. } if target == "VolumeMount"
        ));
    }

    #[test]
    fn test_verify_rejects_required_group_member() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "Resource",
                FieldSpecs::new()
                    .field(FieldSpec::required("inlined", FieldKind::String))
                    .field(FieldSpec::optional("uri", FieldKind::String))
                    .exactly_one_of(&["inlined", "uri"]),
            )
            .unwrap();
        assert!(matches!(
            registry.verify(),
            Err(RegistryError::InvalidGroup { ref field, .. }) if field == "inlined"
        ));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::list_of("Env").to_string(), "array of Env object");
        assert_eq!(
            FieldKind::enumeration(&["never", "always"]).to_string(),
            "one of [never, always]"
        );
        assert_eq!(FieldKind::list_of("Env").referenced_shape(), Some("Env"));
    }
}
