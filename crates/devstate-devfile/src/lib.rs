//! # devstate-devfile: Devfile Assembly
//!
//! Composes validated, normalized records into one consistent
//! [`DevfileContent`] aggregate and keeps it consistent under edits.
//!
//! ## Invariants of an assembled devfile
//!
//! - Command names are unique; container, image, resource and volume names
//!   are unique across all four kinds.
//! - Every volume mount, command target, composite child and event binding
//!   resolves inside the same devfile. Composite commands are acyclic.
//! - Every quantity parses, every container limit is at least its request,
//!   and container memory limits fit within `metadata.globalMemoryLimit`.
//!
//! ## Copy-on-write
//!
//! A `DevfileContent` never changes after assembly. Editing operations
//! (`with_volume`, `without_command`, provisioning, ...) produce a new
//! aggregate and re-run every check, so handles held elsewhere stay valid.

pub mod assemble;
pub mod content;
pub mod error;
pub mod pipeline;
pub mod provision;

pub use assemble::{assemble, assemble_parts, render};
pub use content::DevfileContent;
pub use error::{AssemblyError, AssemblyErrors, EntityKind, PipelineError, ProvisionError};
pub use pipeline::Pipeline;
pub use provision::{provision_resource, provision_volume};
