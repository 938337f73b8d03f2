//! # Provisioning
//!
//! Turns normalized provisioning intents into components of an existing
//! devfile. The request must already carry a name (the normalizer derives
//! one when the caller left it out); the component is then added through
//! the copy-on-write edit path, so every assembly invariant is re-checked.

use devstate_core::{ResourcePostRequest, VolumePostRequest};

use crate::content::DevfileContent;
use crate::error::ProvisionError;

/// Add the volume described by `request` to `devfile`.
///
/// # Errors
///
/// Fails if the request lacks a name or size, or if the volume's name is
/// already taken in the devfile.
pub fn provision_volume(
    devfile: &DevfileContent,
    request: VolumePostRequest,
) -> Result<DevfileContent, ProvisionError> {
    let volume = request.into_volume()?;
    tracing::info!(name = %volume.name, size = %volume.size, ephemeral = volume.ephemeral, "provisioning volume");
    Ok(devfile.with_volume(volume)?)
}

/// Add the resource described by `request` to `devfile`.
///
/// # Errors
///
/// Fails if the request lacks a name, or if the resource's name is
/// already taken in the devfile.
pub fn provision_resource(
    devfile: &DevfileContent,
    request: ResourcePostRequest,
) -> Result<DevfileContent, ProvisionError> {
    let resource = request.into_resource()?;
    tracing::info!(
        name = %resource.name,
        source = resource.source.field(),
        deploy_by_default = %resource.deploy_by_default,
        "provisioning resource"
    );
    Ok(devfile.with_resource(resource)?)
}
