//! # Built-in Shapes
//!
//! The catalogue of devfile record shapes: the four wire-level payloads
//! (`Container`, `DevfileContent`, `ResourcePostRequest`,
//! `VolumePostRequest`) and every nested record they contain.
//!
//! Enum domains are taken from the closed enums of `devstate-core`, so the
//! registry and the typed model agree on the set of legal literals.

use std::sync::OnceLock;

use devstate_core::{CommandGroup, DeployByDefault, EndpointProtocol, Exposure};

use crate::error::RegistryError;
use crate::registry::{FieldDefault, FieldKind, FieldSpec, FieldSpecs, SchemaRegistry};

pub const CONTAINER: &str = "Container";
pub const VOLUME_MOUNT: &str = "VolumeMount";
pub const ANNOTATION: &str = "Annotation";
pub const ENDPOINT: &str = "Endpoint";
pub const ENV: &str = "Env";
pub const VOLUME: &str = "Volume";
pub const IMAGE: &str = "Image";
pub const RESOURCE: &str = "Resource";
pub const COMMAND: &str = "Command";
pub const EXEC_COMMAND: &str = "ExecCommand";
pub const APPLY_COMMAND: &str = "ApplyCommand";
pub const IMAGE_COMMAND: &str = "ImageCommand";
pub const COMPOSITE_COMMAND: &str = "CompositeCommand";
pub const EVENTS: &str = "Events";
pub const METADATA: &str = "Metadata";
pub const DEVFILE_CONTENT: &str = "DevfileContent";
pub const RESOURCE_POST_REQUEST: &str = "ResourcePostRequest";
pub const VOLUME_POST_REQUEST: &str = "VolumePostRequest";

fn req(name: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec::required(name, kind)
}

fn opt(name: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec::optional(name, kind)
}

fn strings() -> FieldKind {
    FieldKind::list(FieldKind::String)
}

fn deploy_policy() -> FieldKind {
    FieldKind::enumeration(DeployByDefault::wire_names())
}

fn container() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(req("image", FieldKind::String))
        .field(req("command", strings()))
        .field(req("args", strings()))
        .field(req("memoryRequest", FieldKind::Quantity))
        .field(req("memoryLimit", FieldKind::Quantity))
        .field(req("cpuRequest", FieldKind::Quantity))
        .field(req("cpuLimit", FieldKind::Quantity))
        .field(req("volumeMounts", FieldKind::list_of(VOLUME_MOUNT)))
        .field(req("annotation", FieldKind::shape(ANNOTATION)))
        .field(req("endpoints", FieldKind::list_of(ENDPOINT)))
        .field(req("env", FieldKind::list_of(ENV)))
        .field(req("configureSources", FieldKind::Bool))
        .field(req("mountSources", FieldKind::Bool))
        .field(req("sourceMapping", FieldKind::String))
}

fn volume_mount() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(opt("path", FieldKind::String).default_value(""))
}

fn annotation() -> FieldSpecs {
    FieldSpecs::new()
        .field(opt("deployment", FieldKind::StringMap))
        .field(opt("service", FieldKind::StringMap))
}

fn endpoint() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(req("targetPort", FieldKind::integer_in(1, i64::from(u16::MAX))))
        .field(
            opt("exposure", FieldKind::enumeration(Exposure::wire_names()))
                .default_value(Exposure::Public.as_str()),
        )
        .field(opt("path", FieldKind::String).default_value(""))
        .field(
            opt("protocol", FieldKind::enumeration(EndpointProtocol::wire_names()))
                .default_value(EndpointProtocol::Http.as_str()),
        )
        .field(opt("secure", FieldKind::Bool).default_value(false))
}

fn env() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(opt("value", FieldKind::String).default_value(""))
}

fn volume() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(opt("size", FieldKind::Quantity).with_default(FieldDefault::VolumeSize))
        .field(opt("ephemeral", FieldKind::Bool).default_value(false))
}

fn image() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(req("imageName", FieldKind::String))
        .field(opt("args", strings()))
        .field(opt("buildContext", FieldKind::String).default_value(""))
        .field(opt("rootRequired", FieldKind::Bool).default_value(false))
        .field(opt("uri", FieldKind::String).default_value(""))
        .field(opt("orphan", FieldKind::Bool).default_value(false))
        .field(opt("autoBuild", deploy_policy()).default_value(DeployByDefault::Undefined.as_str()))
}

fn resource() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(opt("inlined", FieldKind::String))
        .field(opt("uri", FieldKind::String))
        .field(
            opt("deployByDefault", deploy_policy())
                .default_value(DeployByDefault::Undefined.as_str()),
        )
        .field(opt("orphan", FieldKind::Bool).default_value(false))
        .exactly_one_of(&["inlined", "uri"])
}

fn command() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("name", FieldKind::String))
        .field(opt("group", FieldKind::enumeration(CommandGroup::wire_names())))
        .field(opt("default", FieldKind::Bool).default_value(false))
        .field(opt("exec", FieldKind::shape(EXEC_COMMAND)))
        .field(opt("apply", FieldKind::shape(APPLY_COMMAND)))
        .field(opt("image", FieldKind::shape(IMAGE_COMMAND)))
        .field(opt("composite", FieldKind::shape(COMPOSITE_COMMAND)))
        .exactly_one_of(&["exec", "apply", "image", "composite"])
}

fn exec_command() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("component", FieldKind::String))
        .field(req("commandLine", FieldKind::String))
        .field(opt("workingDir", FieldKind::String).default_value(""))
        .field(opt("hotReloadCapable", FieldKind::Bool).default_value(false))
}

fn component_command() -> FieldSpecs {
    FieldSpecs::new().field(req("component", FieldKind::String))
}

fn composite_command() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("commands", strings()))
        .field(opt("parallel", FieldKind::Bool).default_value(false))
}

fn events() -> FieldSpecs {
    FieldSpecs::new()
        .field(opt("preStart", strings()))
        .field(opt("postStart", strings()))
        .field(opt("preStop", strings()))
        .field(opt("postStop", strings()))
}

fn metadata() -> FieldSpecs {
    let mut specs = FieldSpecs::new().field(req("name", FieldKind::String));
    for field in [
        "version",
        "displayName",
        "description",
        "tags",
        "architectures",
        "icon",
    ] {
        specs = specs.field(opt(field, FieldKind::String).default_value(""));
    }
    specs = specs.field(opt("globalMemoryLimit", FieldKind::Quantity).default_value(""));
    for field in ["projectType", "language", "website", "provider", "supportUrl"] {
        specs = specs.field(opt(field, FieldKind::String).default_value(""));
    }
    specs
}

fn devfile_content() -> FieldSpecs {
    FieldSpecs::new()
        .field(req("content", FieldKind::String))
        .field(req("version", FieldKind::String))
        .field(req("commands", FieldKind::list_of(COMMAND)))
        .field(req("containers", FieldKind::list_of(CONTAINER)))
        .field(req("images", FieldKind::list_of(IMAGE)))
        .field(req("resources", FieldKind::list_of(RESOURCE)))
        .field(req("volumes", FieldKind::list_of(VOLUME)))
        .field(req("events", FieldKind::shape(EVENTS)))
        .field(req("metadata", FieldKind::shape(METADATA)))
}

fn resource_post_request() -> FieldSpecs {
    FieldSpecs::new()
        .field(opt("name", FieldKind::String).with_default(FieldDefault::DerivedName {
            prefix: "resource".to_string(),
        }))
        .field(opt("inlined", FieldKind::String))
        .field(opt("uri", FieldKind::String))
        .field(
            opt("deployByDefault", deploy_policy())
                .default_value(DeployByDefault::Undefined.as_str()),
        )
        .exactly_one_of(&["inlined", "uri"])
}

fn volume_post_request() -> FieldSpecs {
    FieldSpecs::new()
        .field(opt("name", FieldKind::String).with_default(FieldDefault::DerivedName {
            prefix: "volume".to_string(),
        }))
        .field(opt("size", FieldKind::Quantity).with_default(FieldDefault::VolumeSize))
        .field(opt("ephemeral", FieldKind::Bool).default_value(false))
}

/// Every built-in shape with its field specs.
pub fn builtin_shapes() -> Vec<(&'static str, FieldSpecs)> {
    vec![
        (CONTAINER, container()),
        (VOLUME_MOUNT, volume_mount()),
        (ANNOTATION, annotation()),
        (ENDPOINT, endpoint()),
        (ENV, env()),
        (VOLUME, volume()),
        (IMAGE, image()),
        (RESOURCE, resource()),
        (COMMAND, command()),
        (EXEC_COMMAND, exec_command()),
        (APPLY_COMMAND, component_command()),
        (IMAGE_COMMAND, component_command()),
        (COMPOSITE_COMMAND, composite_command()),
        (EVENTS, events()),
        (METADATA, metadata()),
        (DEVFILE_CONTENT, devfile_content()),
        (RESOURCE_POST_REQUEST, resource_post_request()),
        (VOLUME_POST_REQUEST, volume_post_request()),
    ]
}

/// Build a registry holding the built-in shapes, checking it for
/// duplicates and dangling references.
pub fn builtin_registry() -> Result<SchemaRegistry, RegistryError> {
    let mut registry = SchemaRegistry::new();
    for (name, specs) in builtin_shapes() {
        registry.register(name, specs)?;
    }
    registry.verify()?;
    Ok(registry)
}

/// The process-wide registry of built-in shapes, populated on first use
/// and read-only afterwards.
pub fn shared() -> &'static SchemaRegistry {
    static SHARED: OnceLock<SchemaRegistry> = OnceLock::new();
    SHARED.get_or_init(|| {
        let mut registry = SchemaRegistry::new();
        for (name, specs) in builtin_shapes() {
            registry.insert_unchecked(name, specs);
        }
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.len(), 18);
        assert_eq!(shared().shape_names(), registry.shape_names());
    }

    #[test]
    fn test_enum_domains_match_model() {
        let registry = shared();
        let kind = &registry
            .lookup(RESOURCE_POST_REQUEST)
            .unwrap()
            .get("deployByDefault")
            .unwrap()
            .kind;
        assert_eq!(kind, &FieldKind::enumeration(&["never", "undefined", "always"]));
    }

    #[test]
    fn test_container_fields_all_required() {
        let specs = shared().lookup(CONTAINER).unwrap();
        assert_eq!(specs.required_fields().count(), specs.fields().len());
        assert_eq!(specs.fields().len(), 15);
    }

    #[test]
    fn test_request_names_are_optional() {
        for shape in [RESOURCE_POST_REQUEST, VOLUME_POST_REQUEST] {
            let name = shared().lookup(shape).unwrap().get("name").unwrap();
            assert!(!name.required);
            assert!(matches!(name.default, Some(FieldDefault::DerivedName { .. })));
        }
    }
}
