//! # Container Components
//!
//! A container is the runnable unit of a devfile: an image plus the
//! command line, resource bounds, mounts, endpoints and environment it
//! runs with. Container names are unique within a devfile and every
//! volume mount must name a volume declared in the same devfile; both are
//! enforced by the assembler, not here.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A container component.
///
/// The four resource bounds are quantity strings; the empty string means
/// the bound is unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Component name, unique across all components of a devfile.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Entrypoint override.
    pub command: Vec<String>,
    /// Arguments passed to the entrypoint.
    pub args: Vec<String>,
    pub memory_request: String,
    pub memory_limit: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    /// Volumes mounted into the container, in declaration order.
    pub volume_mounts: Vec<VolumeMount>,
    pub annotation: Annotation,
    pub endpoints: Vec<Endpoint>,
    pub env: Vec<Env>,
    /// Whether project sources should be configured for this container.
    pub configure_sources: bool,
    /// Whether project sources are mounted into the container.
    pub mount_sources: bool,
    /// Path the sources are mounted at.
    pub source_mapping: String,
}

impl Container {
    /// The request/limit pairs that must satisfy `limit >= request`.
    pub fn resource_bounds(&self) -> [ResourceBound<'_>; 2] {
        [
            ResourceBound {
                resource: BoundedResource::Memory,
                request: &self.memory_request,
                limit: &self.memory_limit,
            },
            ResourceBound {
                resource: BoundedResource::Cpu,
                request: &self.cpu_request,
                limit: &self.cpu_limit,
            },
        ]
    }

    /// Names of the volumes this container mounts, in declaration order.
    pub fn mounted_volumes(&self) -> impl Iterator<Item = &str> {
        self.volume_mounts.iter().map(|m| m.name.as_str())
    }
}

/// A resource with a request and a limit on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundedResource {
    Memory,
    Cpu,
}

impl BoundedResource {
    /// Wire name of the request field.
    pub fn request_field(&self) -> &'static str {
        match self {
            Self::Memory => "memoryRequest",
            Self::Cpu => "cpuRequest",
        }
    }

    /// Wire name of the limit field.
    pub fn limit_field(&self) -> &'static str {
        match self {
            Self::Memory => "memoryLimit",
            Self::Cpu => "cpuLimit",
        }
    }
}

impl fmt::Display for BoundedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

/// A borrowed request/limit pair of one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBound<'a> {
    pub resource: BoundedResource,
    pub request: &'a str,
    pub limit: &'a str,
}

/// Mount of a declared volume into a container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Name of the mounted volume.
    pub name: String,
    /// Mount path inside the container; empty selects the runtime default.
    pub path: String,
}

/// Extra annotations applied to the generated deployment and service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub deployment: BTreeMap<String, String>,
    pub service: BTreeMap<String, String>,
}

/// A port exposed by a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,
    pub target_port: u16,
    pub exposure: Exposure,
    pub path: String,
    pub protocol: EndpointProtocol,
    pub secure: bool,
}

impl Endpoint {
    /// A public, insecure HTTP endpoint on `target_port`.
    pub fn http(name: impl Into<String>, target_port: u16) -> Self {
        Self {
            name: name.into(),
            target_port,
            exposure: Exposure::default(),
            path: String::new(),
            protocol: EndpointProtocol::default(),
            secure: false,
        }
    }
}

/// Visibility of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    /// Reachable from outside the cluster.
    #[default]
    Public,
    /// Reachable only from inside the cluster.
    Internal,
    /// Not exposed.
    None,
}

impl Exposure {
    pub const ALL: [Exposure; 3] = [Self::Public, Self::Internal, Self::None];

    pub fn wire_names() -> &'static [&'static str] {
        &["public", "internal", "none"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::None => "none",
        }
    }
}

impl FromStr for Exposure {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                enum_name: "Exposure",
                value: s.to_string(),
                allowed: Self::wire_names(),
            })
    }
}

/// Application protocol of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointProtocol {
    #[default]
    Http,
    Https,
    Ws,
    Wss,
    Tcp,
    Udp,
}

impl EndpointProtocol {
    pub const ALL: [EndpointProtocol; 6] = [
        Self::Http,
        Self::Https,
        Self::Ws,
        Self::Wss,
        Self::Tcp,
        Self::Udp,
    ];

    pub fn wire_names() -> &'static [&'static str] {
        &["http", "https", "ws", "wss", "tcp", "udp"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ws => "ws",
            Self::Wss => "wss",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl FromStr for EndpointProtocol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                enum_name: "EndpointProtocol",
                value: s.to_string(),
                allowed: Self::wire_names(),
            })
    }
}

/// An environment variable set in a container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Env {
    pub name: String,
    pub value: String,
}

impl Env {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
