//! # Image, Resource and Volume Components
//!
//! The non-container components of a devfile. Together with containers
//! they share one name namespace inside a devfile.

use serde::{Deserialize, Serialize};

use crate::deploy::DeployByDefault;

/// An image built from the project sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    /// Fully qualified name of the image to build.
    pub image_name: String,
    /// Extra arguments passed to the image builder.
    pub args: Vec<String>,
    /// Build context directory, relative to the project root.
    pub build_context: String,
    pub root_required: bool,
    /// Location of the Dockerfile.
    pub uri: String,
    /// Whether the built image outlives the workspace.
    pub orphan: bool,
    /// Whether the image is built automatically on startup.
    pub auto_build: DeployByDefault,
}

/// Where a resource manifest comes from.
///
/// Exactly one source is set: the manifest is inlined or referenced by URI.
/// On the wire this is the `inlined` or `uri` key of the enclosing record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSource {
    /// Manifest text carried in the request.
    Inlined(String),
    /// Location the manifest is fetched from.
    Uri(String),
}

impl ResourceSource {
    /// Wire key of this source.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Inlined(_) => "inlined",
            Self::Uri(_) => "uri",
        }
    }

    /// The inlined manifest or the URI.
    pub fn value(&self) -> &str {
        match self {
            Self::Inlined(s) | Self::Uri(s) => s,
        }
    }
}

/// A Kubernetes/OpenShift manifest deployed alongside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(flatten)]
    pub source: ResourceSource,
    pub deploy_by_default: DeployByDefault,
    /// Whether the deployed resource outlives the workspace.
    pub orphan: bool,
}

impl Resource {
    /// A resource with default deployment policy and no orphaning.
    pub fn new(name: impl Into<String>, source: ResourceSource) -> Self {
        Self {
            name: name.into(),
            source,
            deploy_by_default: DeployByDefault::default(),
            orphan: false,
        }
    }
}

/// A volume that containers can mount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    /// Minimal size, as a quantity string.
    pub size: String,
    /// Ephemeral volumes do not outlive the owning session.
    pub ephemeral: bool,
}
