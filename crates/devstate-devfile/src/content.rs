//! # DevfileContent Aggregate
//!
//! An assembled devfile. Every cross-reference inside it is known to
//! resolve. The aggregate is immutable and cheap to clone (the parts sit
//! behind an `Arc`), so it can be shared across threads freely.
//!
//! Edits are copy-on-write: `with_*` and `without_*` return a new
//! aggregate that has been re-assembled from scratch, and leave the
//! receiver untouched. Adding an entity whose name is taken fails with a
//! duplicate-name error; removing an entity something still refers to
//! fails with the matching unresolved-reference error.

use std::sync::Arc;

use serde_json::Value;

use devstate_core::{
    Command, Container, DevfileParts, Events, Image, Metadata, Resource, Volume,
};

use crate::assemble::rebuild;
use crate::error::{AssemblyError, AssemblyErrors, EntityKind};

/// An immutable, fully resolved devfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevfileContent {
    parts: Arc<DevfileParts>,
}

impl DevfileContent {
    /// Wrap parts that have passed every assembly check.
    pub(crate) fn from_checked(parts: DevfileParts) -> Self {
        Self {
            parts: Arc::new(parts),
        }
    }

    /// Devfile text.
    pub fn content(&self) -> &str {
        &self.parts.content
    }

    /// Devfile schema version.
    pub fn version(&self) -> &str {
        &self.parts.version
    }

    pub fn commands(&self) -> &[Command] {
        &self.parts.commands
    }

    pub fn containers(&self) -> &[Container] {
        &self.parts.containers
    }

    pub fn images(&self) -> &[Image] {
        &self.parts.images
    }

    pub fn resources(&self) -> &[Resource] {
        &self.parts.resources
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.parts.volumes
    }

    pub fn events(&self) -> &Events {
        &self.parts.events
    }

    pub fn metadata(&self) -> &Metadata {
        &self.parts.metadata
    }

    /// All parts, borrowed.
    pub fn parts(&self) -> &DevfileParts {
        &self.parts
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.parts.commands.iter().find(|c| c.name == name)
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.parts.containers.iter().find(|c| c.name == name)
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.parts.images.iter().find(|i| i.name == name)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.parts.resources.iter().find(|r| r.name == name)
    }

    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.parts.volumes.iter().find(|v| v.name == name)
    }

    /// Re-derive the `DevfileContent` wire record.
    pub fn to_record(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&*self.parts)
    }

    /// True if both handles share the same underlying parts.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.parts, &other.parts)
    }

    fn edit(&self, apply: impl FnOnce(&mut DevfileParts)) -> Result<Self, AssemblyErrors> {
        let mut parts = DevfileParts::clone(&self.parts);
        apply(&mut parts);
        rebuild(parts)
    }

    fn edit_removing<T>(
        &self,
        kind: EntityKind,
        name: &str,
        select: impl FnOnce(&mut DevfileParts) -> &mut Vec<T>,
        key: impl Fn(&T) -> &str,
    ) -> Result<Self, AssemblyErrors> {
        let mut parts = DevfileParts::clone(&self.parts);
        let items = select(&mut parts);
        let before = items.len();
        items.retain(|item| key(item) != name);
        if items.len() == before {
            return Err(AssemblyError::UnknownEntity {
                kind,
                name: name.to_string(),
            }
            .into());
        }
        tracing::debug!(%kind, name, "removing entity");
        rebuild(parts)
    }

    pub fn with_container(&self, container: Container) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.containers.push(container))
    }

    pub fn without_container(&self, name: &str) -> Result<Self, AssemblyErrors> {
        self.edit_removing(EntityKind::Container, name, |p| &mut p.containers, |c| c.name.as_str())
    }

    pub fn with_image(&self, image: Image) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.images.push(image))
    }

    pub fn without_image(&self, name: &str) -> Result<Self, AssemblyErrors> {
        self.edit_removing(EntityKind::Image, name, |p| &mut p.images, |i| i.name.as_str())
    }

    pub fn with_resource(&self, resource: Resource) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.resources.push(resource))
    }

    pub fn without_resource(&self, name: &str) -> Result<Self, AssemblyErrors> {
        self.edit_removing(EntityKind::Resource, name, |p| &mut p.resources, |r| r.name.as_str())
    }

    pub fn with_volume(&self, volume: Volume) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.volumes.push(volume))
    }

    pub fn without_volume(&self, name: &str) -> Result<Self, AssemblyErrors> {
        self.edit_removing(EntityKind::Volume, name, |p| &mut p.volumes, |v| v.name.as_str())
    }

    pub fn with_command(&self, command: Command) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.commands.push(command))
    }

    pub fn without_command(&self, name: &str) -> Result<Self, AssemblyErrors> {
        self.edit_removing(EntityKind::Command, name, |p| &mut p.commands, |c| c.name.as_str())
    }

    /// Replace the lifecycle event bindings.
    pub fn with_events(&self, events: Events) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.events = events)
    }

    /// Replace the metadata.
    pub fn with_metadata(&self, metadata: Metadata) -> Result<Self, AssemblyErrors> {
        self.edit(|parts| parts.metadata = metadata)
    }
}
