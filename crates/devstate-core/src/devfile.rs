//! # Devfile Parts
//!
//! The wire shape of a whole devfile (`DevfileContent` on the API) as a
//! plain record, plus its `Events` and `Metadata` sections. `DevfileParts`
//! carries no guarantees: the assembler in `devstate-devfile` turns it into
//! an immutable aggregate whose cross-references are known to resolve.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::component::{Image, Resource, Volume};
use crate::container::Container;

/// Devfile schema version stamped on devfiles assembled from parts.
pub const DEFAULT_SCHEMA_VERSION: &str = "2.2.0";

/// Unchecked contents of a devfile, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileParts {
    /// Raw devfile text the parts were read from.
    pub content: String,
    /// Devfile schema version.
    pub version: String,
    pub commands: Vec<Command>,
    pub containers: Vec<Container>,
    pub images: Vec<Image>,
    pub resources: Vec<Resource>,
    pub volumes: Vec<Volume>,
    pub events: Events,
    pub metadata: Metadata,
}

impl Default for DevfileParts {
    fn default() -> Self {
        Self {
            content: String::new(),
            version: DEFAULT_SCHEMA_VERSION.to_string(),
            commands: Vec::new(),
            containers: Vec::new(),
            images: Vec::new(),
            resources: Vec::new(),
            volumes: Vec::new(),
            events: Events::default(),
            metadata: Metadata::default(),
        }
    }
}

/// Commands bound to workspace lifecycle phases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    pub pre_start: Vec<String>,
    pub post_start: Vec<String>,
    pub pre_stop: Vec<String>,
    pub post_stop: Vec<String>,
}

impl Events {
    /// Every `(phase, command name)` binding, phase by phase.
    pub fn bindings(&self) -> impl Iterator<Item = (EventPhase, &str)> {
        EventPhase::ALL.into_iter().flat_map(move |phase| {
            self.commands(phase)
                .iter()
                .map(move |name| (phase, name.as_str()))
        })
    }

    /// Commands bound to `phase`.
    pub fn commands(&self, phase: EventPhase) -> &[String] {
        match phase {
            EventPhase::PreStart => &self.pre_start,
            EventPhase::PostStart => &self.post_start,
            EventPhase::PreStop => &self.pre_stop,
            EventPhase::PostStop => &self.post_stop,
        }
    }
}

/// A workspace lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPhase {
    PreStart,
    PostStart,
    PreStop,
    PostStop,
}

impl EventPhase {
    pub const ALL: [EventPhase; 4] = [Self::PreStart, Self::PostStart, Self::PreStop, Self::PostStop];

    /// Wire name of the phase's field in `Events`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreStart => "preStart",
            Self::PostStart => "postStart",
            Self::PreStop => "preStop",
            Self::PostStop => "postStop",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata of a devfile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub version: String,
    pub display_name: String,
    pub description: String,
    pub tags: String,
    pub architectures: String,
    pub icon: String,
    /// Upper bound on the summed memory limits of all containers.
    pub global_memory_limit: String,
    pub project_type: String,
    pub language: String,
    pub website: String,
    pub provider: String,
    pub support_url: String,
}
