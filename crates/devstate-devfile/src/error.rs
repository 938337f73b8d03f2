//! # Assembly Errors
//!
//! Cross-entity failures found while assembling a devfile. Every check
//! runs and every failure is kept, so an [`AssemblyErrors`] lists all
//! problems of one `assemble` call in declaration order (metadata,
//! commands, containers, images, resources, volumes, events).

use std::fmt;

use devstate_core::{BoundedResource, CoreError, QuantityError};
use devstate_schema::ValidationErrors;
use thiserror::Error;

/// The kinds of named entity a devfile declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Command,
    Container,
    Image,
    Resource,
    Volume,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Container => "container",
            Self::Image => "image",
            Self::Resource => "resource",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cross-entity violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// A name is declared twice. Containers, images, resources and volumes
    /// share one namespace; commands have their own.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: EntityKind, name: String },

    /// A container mounts a volume the devfile does not declare.
    #[error("container '{container}' mounts undeclared volume '{volume}'")]
    UnresolvedVolumeReference { container: String, volume: String },

    /// An exec command targets a container the devfile does not declare.
    #[error("command '{command}' targets undeclared container '{container}'")]
    UnresolvedContainerReference { command: String, container: String },

    /// An apply or image command targets a component of the wrong kind or
    /// one that is not declared.
    #[error("command '{command}' targets undeclared {expected} '{component}'")]
    UnresolvedComponentReference {
        command: String,
        component: String,
        expected: &'static str,
    },

    /// A composite command or an event names an undeclared command.
    #[error("{referrer} refers to undeclared command '{command}'")]
    UnresolvedCommandReference { referrer: String, command: String },

    /// Composite commands include each other in a cycle.
    #[error("composite commands form a cycle: {}", .path.join(" -> "))]
    CommandCycle { path: Vec<String> },

    /// A container's limit is below its request.
    #[error("container '{container}' {resource} limit {limit} is below request {request}")]
    InvalidResourceBounds {
        container: String,
        resource: BoundedResource,
        request: String,
        limit: String,
    },

    /// A quantity field does not parse.
    #[error("{entity}.{field} = {value:?} is not a valid quantity: {reason}")]
    InvalidQuantity {
        entity: String,
        field: &'static str,
        value: String,
        reason: QuantityError,
    },

    /// The containers together may use more memory than the devfile allows.
    #[error("container memory limits total {total_bytes} bytes, above globalMemoryLimit {limit}")]
    GlobalMemoryLimitExceeded { limit: String, total_bytes: u128 },

    /// An edit names an entity the devfile does not have.
    #[error("no {kind} named '{name}'")]
    UnknownEntity { kind: EntityKind, name: String },

    /// The aggregate could not be rendered as devfile text.
    #[error("cannot render devfile content: {reason}")]
    Render { reason: String },
}

/// All violations found by one `assemble` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyErrors {
    errors: Vec<AssemblyError>,
}

impl AssemblyErrors {
    pub(crate) fn new(errors: Vec<AssemblyError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[AssemblyError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssemblyError> {
        self.errors.iter()
    }

    pub fn into_inner(self) -> Vec<AssemblyError> {
        self.errors
    }
}

impl From<AssemblyError> for AssemblyErrors {
    fn from(error: AssemblyError) -> Self {
        Self::new(vec![error])
    }
}

impl fmt::Display for AssemblyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "devfile assembly failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssemblyErrors {}

impl<'a> IntoIterator for &'a AssemblyErrors {
    type Item = &'a AssemblyError;
    type IntoIter = std::slice::Iter<'a, AssemblyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Failure to add a provisioned entity to a devfile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// The request has not been normalized (it still lacks a name or size).
    #[error("request is incomplete: {0}")]
    Request(#[from] CoreError),

    #[error(transparent)]
    Assembly(#[from] AssemblyErrors),
}

/// Failure at any stage of the raw record to devfile pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A normalized record did not decode into the typed model.
    #[error("cannot decode normalized {shape} record: {source}")]
    Decode {
        shape: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request is incomplete: {0}")]
    Request(#[from] CoreError),

    #[error(transparent)]
    Assembly(#[from] AssemblyErrors),
}

impl From<ProvisionError> for PipelineError {
    fn from(error: ProvisionError) -> Self {
        match error {
            ProvisionError::Request(e) => Self::Request(e),
            ProvisionError::Assembly(e) => Self::Assembly(e),
        }
    }
}
