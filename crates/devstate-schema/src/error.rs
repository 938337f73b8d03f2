//! # Schema Errors
//!
//! Registry misuse is a startup failure ([`RegistryError`]). Record
//! validation failures are recoverable and reported to the caller as a
//! [`ValidationErrors`] collection: every violation in the record, in a
//! deterministic order, each naming the shape, the field, the offending
//! value and its JSON Pointer path.

use std::fmt;

use devstate_core::QuantityError;
use thiserror::Error;

/// Errors raised while building or querying the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A shape with this name is already registered.
    #[error("shape '{shape}' is already registered")]
    DuplicateShape { shape: String },

    /// No shape is registered under this name.
    #[error("shape '{shape}' is not registered")]
    ShapeNotFound { shape: String },

    /// A field refers to a nested shape that is not registered.
    #[error("{shape}.{field} refers to unregistered shape '{target}'")]
    DanglingShapeReference {
        shape: String,
        field: String,
        target: String,
    },

    /// An exclusive group names a field that is undeclared or required.
    #[error("exclusive group on '{shape}' names '{field}', which is not an optional field of the shape")]
    InvalidGroup { shape: String, field: String },
}

/// A single violation found while validating a record.
///
/// `path` is the JSON Pointer of the offending value (or of the object
/// that should have contained it); the empty pointer is the record root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field (or an exactly-one group, named `a|b`) is absent.
    #[error("{}: {shape} is missing required field '{field}'", display_path(.path))]
    MissingField {
        shape: String,
        field: String,
        path: String,
    },

    /// Strict mode: the record carries a field the shape does not declare.
    #[error("{}: {shape} has unknown field '{field}'", display_path(.path))]
    UnknownField {
        shape: String,
        field: String,
        path: String,
    },

    /// An enum-typed field holds a value outside its closed set.
    #[error("{}: {shape}.{field} = {value:?} is not one of [{}]", display_path(.path), .allowed.join(", "))]
    InvalidEnumValue {
        shape: String,
        field: String,
        value: String,
        allowed: Vec<String>,
        path: String,
    },

    /// More than one field of an exclusive group is set.
    #[error("{}: {shape} sets mutually exclusive fields [{}]", display_path(.path), .fields.join(", "))]
    ConflictingFields {
        shape: String,
        fields: Vec<String>,
        path: String,
    },

    /// A value has the wrong JSON type for its field.
    #[error("{}: {shape}.{field} must be {expected}, found {found}", display_path(.path))]
    TypeMismatch {
        shape: String,
        field: String,
        expected: String,
        found: &'static str,
        path: String,
    },

    /// An integer lies outside the field's bounds.
    #[error("{}: {shape}.{field} = {value} is out of range", display_path(.path))]
    OutOfRange {
        shape: String,
        field: String,
        value: String,
        path: String,
    },

    /// A quantity string does not parse.
    #[error("{}: {shape}.{field} = {value:?} is not a valid quantity: {reason}", display_path(.path))]
    InvalidQuantity {
        shape: String,
        field: String,
        value: String,
        reason: QuantityError,
        path: String,
    },

    /// The record (or a nested record) is not a JSON object.
    #[error("{}: {shape} must be an object, found {found}", display_path(.path))]
    NotAnObject {
        shape: String,
        found: &'static str,
        path: String,
    },

    /// The shape to validate against is not registered.
    #[error("shape '{shape}' is not registered")]
    UnknownShape { shape: String },
}

impl ValidationError {
    /// The field the violation is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. }
            | Self::UnknownField { field, .. }
            | Self::InvalidEnumValue { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidQuantity { field, .. } => Some(field),
            Self::ConflictingFields { .. } | Self::NotAnObject { .. } | Self::UnknownShape { .. } => {
                None
            }
        }
    }

    /// JSON Pointer of the offending value.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path, .. }
            | Self::UnknownField { path, .. }
            | Self::InvalidEnumValue { path, .. }
            | Self::ConflictingFields { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::OutOfRange { path, .. }
            | Self::InvalidQuantity { path, .. }
            | Self::NotAnObject { path, .. } => path,
            Self::UnknownShape { .. } => "",
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

/// All violations found in one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    shape: String,
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(shape: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            shape: shape.into(),
            errors,
        }
    }

    /// The shape the record was validated against.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations in the order they were found.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record failed validation with {} error(s):",
            self.shape,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_display() {
        let err = ValidationError::MissingField {
            shape: "Container".into(),
            field: "image".into(),
            path: String::new(),
        };
        assert_eq!(err.to_string(), "(root): Container is missing required field 'image'");
    }

    #[test]
    fn test_nested_path_display() {
        let err = ValidationError::InvalidEnumValue {
            shape: "Resource".into(),
            field: "deployByDefault".into(),
            value: "sometimes".into(),
            allowed: vec!["never".into(), "undefined".into(), "always".into()],
            path: "/resources/0/deployByDefault".into(),
        };
        let display = err.to_string();
        assert!(display.starts_with("/resources/0/deployByDefault:"));
        assert!(display.contains("\"sometimes\""));
        assert!(display.contains("never, undefined, always"));
    }

    #[test]
    fn test_collection_display_lists_every_error() {
        let errors = ValidationErrors::new(
            "ResourcePostRequest",
            vec![
                ValidationError::ConflictingFields {
                    shape: "ResourcePostRequest".into(),
                    fields: vec!["inlined".into(), "uri".into()],
                    path: String::new(),
                },
                ValidationError::UnknownField {
                    shape: "ResourcePostRequest".into(),
                    field: "colour".into(),
                    path: "/colour".into(),
                },
            ],
        );
        let display = errors.to_string();
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("inlined, uri"));
        assert!(display.contains("/colour"));
        assert_eq!(errors.errors()[1].field(), Some("colour"));
    }
}
