//! # devstate-core: Typed Devfile Model
//!
//! The leaf crate of the devstate workspace. It defines the typed records
//! that describe a development workspace (a "devfile"): containers,
//! commands, images, resources, volumes, lifecycle events and metadata,
//! together with the provisioning intents used to add resources and
//! volumes to an existing devfile.
//!
//! ## Key Design Principles
//!
//! 1. **Closed enums, not open strings.** `DeployByDefault`, `Exposure`,
//!    `EndpointProtocol` and `CommandGroup` are sum types. Each exposes its
//!    wire names so the schema registry and the model cannot drift apart.
//!
//! 2. **Illegal states are unrepresentable.** A resource payload is either
//!    inlined or referenced by URI (`ResourceSource`), never both. A command
//!    is exactly one of exec / apply / image / composite (`CommandKind`).
//!
//! 3. **Quantities compare numerically.** `Quantity` parses `"512Mi"`,
//!    `"0.5"`, `"250m"` into exact milli-units while preserving the original
//!    text for round-trips.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `devstate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Every wire type derives `Serialize`/`Deserialize` with camelCase names.

pub mod command;
pub mod component;
pub mod container;
pub mod deploy;
pub mod devfile;
pub mod error;
pub mod quantity;
pub mod request;

pub use command::{
    ApplyCommand, Command, CommandGroup, CommandKind, CompositeCommand, ExecCommand, ImageCommand,
};
pub use component::{Image, Resource, ResourceSource, Volume};
pub use container::{
    Annotation, BoundedResource, Container, Endpoint, EndpointProtocol, Env, Exposure,
    ResourceBound, VolumeMount,
};
pub use deploy::DeployByDefault;
pub use devfile::{DevfileParts, EventPhase, Events, Metadata, DEFAULT_SCHEMA_VERSION};
pub use error::{CoreError, QuantityError};
pub use quantity::Quantity;
pub use request::{ResourcePostRequest, VolumePostRequest};
