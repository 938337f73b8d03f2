//! # Provisioning Requests
//!
//! Intents to add a resource or a volume to a devfile. These are not the
//! entities themselves: the name is optional (a default is derived when it
//! is missing) and nothing here is persisted. Once a request has been
//! normalized every optional field is set, and it converts into the
//! corresponding component.

use serde::{Deserialize, Serialize};

use crate::component::{Resource, ResourceSource, Volume};
use crate::deploy::DeployByDefault;
use crate::error::CoreError;

/// Request to add a resource to a devfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub source: ResourceSource,
    #[serde(default)]
    pub deploy_by_default: DeployByDefault,
}

impl ResourcePostRequest {
    /// Convert into a resource component.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if the request has no name.
    pub fn into_resource(self) -> Result<Resource, CoreError> {
        let name = self.name.ok_or(CoreError::MissingField {
            shape: "ResourcePostRequest",
            field: "name",
        })?;
        Ok(Resource {
            name,
            source: self.source,
            deploy_by_default: self.deploy_by_default,
            orphan: false,
        })
    }
}

/// Request to add a volume to a devfile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Minimal size of the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// True if the volume does not outlive the owning session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
}

impl VolumePostRequest {
    /// Convert into a volume component.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if the request has no name or size.
    pub fn into_volume(self) -> Result<Volume, CoreError> {
        let name = self.name.ok_or(CoreError::MissingField {
            shape: "VolumePostRequest",
            field: "name",
        })?;
        let size = self.size.ok_or(CoreError::MissingField {
            shape: "VolumePostRequest",
            field: "size",
        })?;
        Ok(Volume {
            name,
            size,
            ephemeral: self.ephemeral.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_request_without_name_or_policy() {
        let request: ResourcePostRequest =
            serde_json::from_value(json!({ "uri": "https://example.com/svc.yaml" })).unwrap();
        assert_eq!(request.name, None);
        assert_eq!(request.deploy_by_default, DeployByDefault::Undefined);
        assert_eq!(request.source, ResourceSource::Uri("https://example.com/svc.yaml".into()));
    }

    #[test]
    fn test_resource_request_into_resource() {
        let request = ResourcePostRequest {
            name: Some("svc".into()),
            source: ResourceSource::Inlined("kind: Service".into()),
            deploy_by_default: DeployByDefault::Always,
        };
        let resource = request.into_resource().unwrap();
        assert_eq!(resource.name, "svc");
        assert_eq!(resource.deploy_by_default, DeployByDefault::Always);
        assert!(!resource.orphan);
    }

    #[test]
    fn test_unnamed_requests_do_not_convert() {
        let request = ResourcePostRequest {
            name: None,
            source: ResourceSource::Uri("x".into()),
            deploy_by_default: DeployByDefault::Never,
        };
        assert_eq!(
            request.into_resource(),
            Err(CoreError::MissingField {
                shape: "ResourcePostRequest",
                field: "name"
            })
        );
        assert!(VolumePostRequest::default().into_volume().is_err());
    }

    #[test]
    fn test_volume_request_into_volume() {
        let request: VolumePostRequest =
            serde_json::from_value(json!({ "name": "cache", "size": "1Gi", "ephemeral": true }))
                .unwrap();
        let volume = request.into_volume().unwrap();
        assert_eq!(volume.name, "cache");
        assert_eq!(volume.size, "1Gi");
        assert!(volume.ephemeral);
    }
}
