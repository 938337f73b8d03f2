//! # Error Types
//!
//! Errors raised by the typed model itself. Schema validation and devfile
//! assembly have their own error families in `devstate-schema` and
//! `devstate-devfile`; the errors here cover parsing of closed enums and
//! quantity strings, which both of those layers rely on.

use thiserror::Error;

/// Top-level error type for the typed model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string did not name any variant of a closed enum.
    #[error("{value:?} is not a valid {enum_name} (expected one of: {})", .allowed.join(", "))]
    UnknownVariant {
        /// Name of the enum type being parsed.
        enum_name: &'static str,
        /// The rejected input.
        value: String,
        /// The legal wire names.
        allowed: &'static [&'static str],
    },

    /// A field the conversion depends on was absent.
    #[error("{shape}.{field} is required")]
    MissingField {
        /// Shape the field belongs to.
        shape: &'static str,
        /// The absent field.
        field: &'static str,
    },

    /// A quantity string could not be parsed.
    #[error("invalid quantity: {0}")]
    Quantity(#[from] QuantityError),
}

/// Error parsing a resource quantity string such as `"512Mi"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The quantity text was empty.
    #[error("quantity is empty")]
    Empty,

    /// Quantities are amounts of a resource and cannot be negative.
    #[error("quantity {0:?} is negative")]
    Negative(String),

    /// The numeric part is missing or malformed.
    #[error("quantity {0:?} has no valid numeric part")]
    InvalidNumber(String),

    /// The unit suffix is not a recognised binary, decimal or exponent suffix.
    #[error("quantity {text:?} has unknown suffix {suffix:?}")]
    UnknownSuffix {
        /// The full quantity text.
        text: String,
        /// The unrecognised suffix.
        suffix: String,
    },

    /// The amount does not fit in the internal representation.
    #[error("quantity {0:?} is too large")]
    Overflow(String),
}
