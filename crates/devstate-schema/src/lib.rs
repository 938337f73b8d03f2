//! # devstate-schema: Registry, Validator, Normalizer
//!
//! Schema-driven checking of raw devfile records. Instead of one
//! hand-written validator per record type, every shape is described once
//! as data in the [`SchemaRegistry`] and a single generic [`Validator`] and
//! [`Normalizer`] interpret those descriptions.
//!
//! ## Pipeline
//!
//! ```text
//! raw JSON/YAML ─▶ Validator ─▶ ValidatedRecord ─▶ Normalizer ─▶ NormalizedRecord ─▶ typed model
//! ```
//!
//! - The **Validator** enforces required fields, closed enum domains,
//!   exclusive field groups, value kinds and integer bounds, and either
//!   rejects (strict) or drops (lenient) unknown fields. It collects every
//!   violation instead of stopping at the first.
//! - The **Normalizer** applies defaults. It never fails and is idempotent.
//!
//! ## Concurrency
//!
//! The registry is populated once and then only read; [`shapes::shared`]
//! exposes the built-in catalogue as a `&'static` reference that any
//! number of threads can validate against without locking.

pub mod document;
pub mod error;
pub mod export;
pub mod normalize;
pub mod registry;
pub mod shapes;
pub mod validate;

pub use document::{load_document, parse_document, DocumentError, DocumentFormat};
pub use error::{RegistryError, ValidationError, ValidationErrors};
pub use export::export_json_schema;
pub use normalize::{derive_name, NormalizedRecord, Normalizer, NormalizerConfig};
pub use registry::{ExclusiveGroup, FieldDefault, FieldKind, FieldSpec, FieldSpecs, SchemaRegistry};
pub use shapes::{builtin_registry, builtin_shapes};
pub use validate::{ValidatedRecord, Validator, ValidatorConfig};
