//! # Devfile Assembler
//!
//! Composes typed devfile parts into an immutable [`DevfileContent`] after
//! checking every cross-entity invariant:
//!
//! 1. names are unique (commands among commands; containers, images,
//!    resources and volumes in one shared component namespace);
//! 2. every volume mount resolves to a declared volume;
//! 3. every command resolves: exec commands to a container, apply
//!    commands to an image or resource, image commands to an image,
//!    composite commands to other commands, without cycles;
//! 4. every event names a declared command;
//! 5. every quantity parses, every resource limit is at least its request,
//!    and the container memory limits fit within `globalMemoryLimit`.
//!
//! Checks never short-circuit. Errors are reported section by section in
//! declaration order: metadata, commands, containers, images, resources,
//! volumes, events.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use devstate_core::{
    Command, CommandKind, Container, DevfileParts, Events, Image, Metadata, Quantity, Resource,
    Volume, DEFAULT_SCHEMA_VERSION,
};

use crate::content::DevfileContent;
use crate::error::{AssemblyError, AssemblyErrors, EntityKind};

/// Assemble a devfile from its parts.
///
/// The aggregate is stamped with the default schema version and its
/// `content` is the YAML rendering of the parts.
///
/// # Errors
///
/// Returns every cross-entity violation found, in declaration order.
pub fn assemble(
    metadata: Metadata,
    commands: Vec<Command>,
    containers: Vec<Container>,
    images: Vec<Image>,
    resources: Vec<Resource>,
    volumes: Vec<Volume>,
    events: Events,
) -> Result<DevfileContent, AssemblyErrors> {
    let parts = DevfileParts {
        content: String::new(),
        version: DEFAULT_SCHEMA_VERSION.to_string(),
        commands,
        containers,
        images,
        resources,
        volumes,
        events,
        metadata,
    };
    rebuild(parts)
}

/// Assemble a devfile read from a wire record, keeping its `content` and
/// `version` verbatim.
///
/// # Errors
///
/// Returns every cross-entity violation found, in declaration order.
pub fn assemble_parts(parts: DevfileParts) -> Result<DevfileContent, AssemblyErrors> {
    verify(&parts)?;
    Ok(DevfileContent::from_checked(parts))
}

/// Check `parts` and re-render their `content`.
pub(crate) fn rebuild(mut parts: DevfileParts) -> Result<DevfileContent, AssemblyErrors> {
    verify(&parts)?;
    parts.content = render(&parts)?;
    Ok(DevfileContent::from_checked(parts))
}

fn verify(parts: &DevfileParts) -> Result<(), AssemblyErrors> {
    let errors = check(parts);
    if errors.is_empty() {
        tracing::debug!(
            name = %parts.metadata.name,
            commands = parts.commands.len(),
            containers = parts.containers.len(),
            volumes = parts.volumes.len(),
            "devfile assembled"
        );
        Ok(())
    } else {
        tracing::debug!(name = %parts.metadata.name, errors = errors.len(), "devfile rejected");
        Err(AssemblyErrors::new(errors))
    }
}

/// The devfile text written to `content`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DevfileDocument<'a> {
    schema_version: &'a str,
    metadata: &'a Metadata,
    containers: &'a [Container],
    images: &'a [Image],
    resources: &'a [Resource],
    volumes: &'a [Volume],
    commands: &'a [Command],
    events: &'a Events,
}

/// Render `parts` as devfile YAML.
pub fn render(parts: &DevfileParts) -> Result<String, AssemblyError> {
    let document = DevfileDocument {
        schema_version: &parts.version,
        metadata: &parts.metadata,
        containers: &parts.containers,
        images: &parts.images,
        resources: &parts.resources,
        volumes: &parts.volumes,
        commands: &parts.commands,
        events: &parts.events,
    };
    serde_yaml::to_string(&document).map_err(|e| AssemblyError::Render {
        reason: e.to_string(),
    })
}

/// Declared names, by kind.
struct Names<'a> {
    commands: HashSet<&'a str>,
    containers: HashSet<&'a str>,
    images: HashSet<&'a str>,
    resources: HashSet<&'a str>,
    volumes: HashSet<&'a str>,
}

impl<'a> Names<'a> {
    fn of(parts: &'a DevfileParts) -> Self {
        Self {
            commands: parts.commands.iter().map(|c| c.name.as_str()).collect(),
            containers: parts.containers.iter().map(|c| c.name.as_str()).collect(),
            images: parts.images.iter().map(|i| i.name.as_str()).collect(),
            resources: parts.resources.iter().map(|r| r.name.as_str()).collect(),
            volumes: parts.volumes.iter().map(|v| v.name.as_str()).collect(),
        }
    }
}

/// Run every check, collecting violations in declaration order.
pub(crate) fn check(parts: &DevfileParts) -> Vec<AssemblyError> {
    let names = Names::of(parts);
    let mut errors = Vec::new();
    let mut components = HashSet::new();

    check_metadata(parts, &mut errors);
    check_commands(&parts.commands, &names, &mut errors);

    for container in &parts.containers {
        claim(&mut components, EntityKind::Container, &container.name, &mut errors);
        check_container(container, &names, &mut errors);
    }
    for image in &parts.images {
        claim(&mut components, EntityKind::Image, &image.name, &mut errors);
    }
    for resource in &parts.resources {
        claim(&mut components, EntityKind::Resource, &resource.name, &mut errors);
    }
    for volume in &parts.volumes {
        claim(&mut components, EntityKind::Volume, &volume.name, &mut errors);
        parse_quantity(&volume.name, "size", &volume.size, &mut errors);
    }

    for (phase, command) in parts.events.bindings() {
        if !names.commands.contains(command) {
            errors.push(AssemblyError::UnresolvedCommandReference {
                referrer: format!("{phase} event"),
                command: command.to_string(),
            });
        }
    }

    errors
}

fn claim<'a>(
    taken: &mut HashSet<&'a str>,
    kind: EntityKind,
    name: &'a str,
    errors: &mut Vec<AssemblyError>,
) {
    if !taken.insert(name) {
        errors.push(AssemblyError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
}

fn parse_quantity(
    entity: &str,
    field: &'static str,
    text: &str,
    errors: &mut Vec<AssemblyError>,
) -> Option<Quantity> {
    match Quantity::parse_optional(text) {
        Ok(quantity) => quantity,
        Err(reason) => {
            errors.push(AssemblyError::InvalidQuantity {
                entity: entity.to_string(),
                field,
                value: text.to_string(),
                reason,
            });
            None
        }
    }
}

fn check_metadata(parts: &DevfileParts, errors: &mut Vec<AssemblyError>) {
    let text = &parts.metadata.global_memory_limit;
    let Some(limit) = parse_quantity("metadata", "globalMemoryLimit", text, errors) else {
        return;
    };
    let total = parts
        .containers
        .iter()
        .filter_map(|c| Quantity::parse_optional(&c.memory_limit).ok().flatten())
        .fold(0u128, |sum, q| sum.saturating_add(q.millis()));
    if total > limit.millis() {
        errors.push(AssemblyError::GlobalMemoryLimitExceeded {
            limit: text.clone(),
            total_bytes: total.div_ceil(1000),
        });
    }
}

fn check_commands(commands: &[Command], names: &Names<'_>, errors: &mut Vec<AssemblyError>) {
    let mut seen = HashSet::new();
    for command in commands {
        claim(&mut seen, EntityKind::Command, &command.name, errors);
        match &command.kind {
            CommandKind::Exec(exec) => {
                if !names.containers.contains(exec.component.as_str()) {
                    errors.push(AssemblyError::UnresolvedContainerReference {
                        command: command.name.clone(),
                        container: exec.component.clone(),
                    });
                }
            }
            CommandKind::Apply(apply) => {
                let target = apply.component.as_str();
                if !names.images.contains(target) && !names.resources.contains(target) {
                    errors.push(AssemblyError::UnresolvedComponentReference {
                        command: command.name.clone(),
                        component: apply.component.clone(),
                        expected: "image or resource",
                    });
                }
            }
            CommandKind::Image(image) => {
                if !names.images.contains(image.component.as_str()) {
                    errors.push(AssemblyError::UnresolvedComponentReference {
                        command: command.name.clone(),
                        component: image.component.clone(),
                        expected: "image",
                    });
                }
            }
            CommandKind::Composite(composite) => {
                for child in &composite.commands {
                    if !names.commands.contains(child.as_str()) {
                        errors.push(AssemblyError::UnresolvedCommandReference {
                            referrer: format!("composite command '{}'", command.name),
                            command: child.clone(),
                        });
                    }
                }
            }
        }
    }

    for path in command_cycles(commands) {
        errors.push(AssemblyError::CommandCycle { path });
    }
}

fn check_container(container: &Container, names: &Names<'_>, errors: &mut Vec<AssemblyError>) {
    for volume in container.mounted_volumes() {
        if !names.volumes.contains(volume) {
            errors.push(AssemblyError::UnresolvedVolumeReference {
                container: container.name.clone(),
                volume: volume.to_string(),
            });
        }
    }

    for bound in container.resource_bounds() {
        let request = parse_quantity(&container.name, bound.resource.request_field(), bound.request, errors);
        let limit = parse_quantity(&container.name, bound.resource.limit_field(), bound.limit, errors);
        if let (Some(request), Some(limit)) = (request, limit) {
            if limit < request {
                errors.push(AssemblyError::InvalidResourceBounds {
                    container: container.name.clone(),
                    resource: bound.resource,
                    request: bound.request.to_string(),
                    limit: bound.limit.to_string(),
                });
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Cycles among composite commands, each as the path of names from the
/// first repeated command back to itself. Found by depth-first search in
/// declaration order, so the result is deterministic.
fn command_cycles(commands: &[Command]) -> Vec<Vec<String>> {
    let graph: HashMap<&str, &[String]> = commands
        .iter()
        .filter_map(|c| match &c.kind {
            CommandKind::Composite(composite) => Some((c.name.as_str(), composite.commands.as_slice())),
            _ => None,
        })
        .collect();

    let mut state = HashMap::new();
    let mut cycles = Vec::new();
    for command in commands {
        if !state.contains_key(command.name.as_str()) {
            visit(&command.name, &graph, &mut state, &mut cycles);
        }
    }
    cycles
}

/// Iterative depth-first walk from `root`. Each frame holds a command and
/// the index of its next child; the frames form the current path.
fn visit<'a>(
    root: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    state: &mut HashMap<&'a str, Visit>,
    cycles: &mut Vec<Vec<String>>,
) {
    state.insert(root, Visit::InProgress);
    let mut frames: Vec<(&'a str, usize)> = vec![(root, 0)];
    while let Some(frame) = frames.last_mut() {
        let (name, index) = *frame;
        let children: &'a [String] = graph.get(name).copied().unwrap_or(&[]);
        let Some(child) = children.get(index) else {
            frames.pop();
            state.insert(name, Visit::Done);
            continue;
        };
        frame.1 += 1;
        match state.get(child.as_str()) {
            Some(Visit::InProgress) => {
                let start = frames
                    .iter()
                    .position(|(n, _)| *n == child.as_str())
                    .unwrap_or(0);
                let mut path: Vec<String> = frames[start..].iter().map(|(n, _)| n.to_string()).collect();
                path.push(child.clone());
                cycles.push(path);
            }
            Some(Visit::Done) => {}
            None => {
                state.insert(child.as_str(), Visit::InProgress);
                frames.push((child.as_str(), 0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devstate_core::{
        ApplyCommand, CompositeCommand, ExecCommand, ImageCommand, ResourceSource, VolumeMount,
    };

    fn container(name: &str, mounts: &[&str]) -> Container {
        Container {
            name: name.into(),
            image: "app:latest".into(),
            volume_mounts: mounts
                .iter()
                .map(|m| VolumeMount {
                    name: m.to_string(),
                    path: format!("/{m}"),
                })
                .collect(),
            ..Container::default()
        }
    }

    fn volume(name: &str) -> Volume {
        Volume {
            name: name.into(),
            size: "1Gi".into(),
            ephemeral: false,
        }
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "demo".into(),
            ..Metadata::default()
        }
    }

    fn exec(name: &str, component: &str) -> Command {
        Command::new(
            name,
            CommandKind::Exec(ExecCommand {
                component: component.into(),
                command_line: "make".into(),
                working_dir: String::new(),
                hot_reload_capable: false,
            }),
        )
    }

    fn composite(name: &str, children: &[&str]) -> Command {
        Command::new(
            name,
            CommandKind::Composite(CompositeCommand {
                commands: children.iter().map(|c| c.to_string()).collect(),
                parallel: false,
            }),
        )
    }

    fn parts() -> DevfileParts {
        DevfileParts {
            metadata: metadata(),
            containers: vec![container("app", &["cache"])],
            volumes: vec![volume("cache")],
            commands: vec![exec("build", "app")],
            ..DevfileParts::default()
        }
    }

    #[test]
    fn test_valid_parts_pass() {
        assert!(check(&parts()).is_empty());
    }

    #[test]
    fn test_unresolved_volume_reference() {
        let errors = check(&DevfileParts {
            volumes: vec![],
            ..parts()
        });
        assert_eq!(
            errors,
            vec![AssemblyError::UnresolvedVolumeReference {
                container: "app".into(),
                volume: "cache".into(),
            }]
        );
    }

    #[test]
    fn test_shared_component_namespace() {
        let mut parts = parts();
        parts.containers.push(container("app", &[]));
        parts.volumes.push(volume("app"));
        let errors = check(&parts);
        assert_eq!(
            errors,
            vec![
                AssemblyError::DuplicateName {
                    kind: EntityKind::Container,
                    name: "app".into()
                },
                AssemblyError::DuplicateName {
                    kind: EntityKind::Volume,
                    name: "app".into()
                },
            ]
        );
    }

    #[test]
    fn test_command_targets() {
        let mut parts = parts();
        parts.resources.push(Resource::new("svc", ResourceSource::Uri("x".into())));
        parts.commands = vec![
            exec("run", "ghost"),
            Command::new("deploy", CommandKind::Apply(ApplyCommand { component: "svc".into() })),
            Command::new("push", CommandKind::Image(ImageCommand { component: "svc".into() })),
        ];
        let errors = check(&parts);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            AssemblyError::UnresolvedContainerReference { command, container } if command == "run" && container == "ghost"
        ));
        assert!(matches!(
            &errors[1],
            AssemblyError::UnresolvedComponentReference { expected: "image", .. }
        ));
    }

    #[test]
    fn test_composite_cycle_detected_once() {
        let mut parts = parts();
        parts.commands = vec![
            composite("all", &["a"]),
            composite("a", &["b"]),
            composite("b", &["a", "build"]),
            exec("build", "app"),
        ];
        let errors = check(&parts);
        assert_eq!(
            errors,
            vec![AssemblyError::CommandCycle {
                path: vec!["a".into(), "b".into(), "a".into()]
            }]
        );
    }

    fn chain(len: usize) -> Vec<Command> {
        let names: Vec<String> = (0..len).map(|i| format!("c{i}")).collect();
        let mut commands: Vec<Command> = names
            .windows(2)
            .map(|pair| composite(&pair[0], &[pair[1].as_str()]))
            .collect();
        commands.push(exec(&names[len - 1], "app"));
        commands
    }

    #[test]
    fn test_long_composite_chain_does_not_exhaust_stack() {
        let mut parts = parts();
        parts.commands = chain(100_000);
        assert!(check(&parts).is_empty());
    }

    #[test]
    fn test_cycle_at_end_of_long_chain() {
        let len = 100_000;
        let mut parts = parts();
        parts.commands = chain(len);
        let last = format!("c{}", len - 1);
        let before = format!("c{}", len - 2);
        parts.commands[len - 1] = composite(&last, &[before.as_str()]);
        assert_eq!(
            check(&parts),
            vec![AssemblyError::CommandCycle {
                path: vec![before.clone(), last, before]
            }]
        );
    }

    #[test]
    fn test_resource_bounds_and_quantities() {
        let mut parts = parts();
        parts.containers[0].memory_request = "1Gi".into();
        parts.containers[0].memory_limit = "512Mi".into();
        parts.containers[0].cpu_request = "half".into();
        parts.containers[0].cpu_limit = "500m".into();
        let errors = check(&parts);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            AssemblyError::InvalidResourceBounds { container, .. } if container == "app"
        ));
        assert!(matches!(
            &errors[1],
            AssemblyError::InvalidQuantity { field: "cpuRequest", .. }
        ));
    }

    #[test]
    fn test_equal_bounds_in_different_units() {
        let mut parts = parts();
        parts.containers[0].cpu_request = "0.5".into();
        parts.containers[0].cpu_limit = "500m".into();
        assert!(check(&parts).is_empty());
    }

    #[test]
    fn test_global_memory_limit() {
        let mut parts = parts();
        parts.metadata.global_memory_limit = "1Gi".into();
        parts.containers[0].memory_limit = "768Mi".into();
        let mut second = container("worker", &[]);
        second.memory_limit = "512Mi".into();
        parts.containers.push(second);
        let errors = check(&parts);
        assert!(matches!(
            &errors[0],
            AssemblyError::GlobalMemoryLimitExceeded { total_bytes, .. } if *total_bytes == 1280 * 1024 * 1024
        ));
    }

    #[test]
    fn test_errors_in_declaration_order() {
        let mut parts = parts();
        parts.metadata.global_memory_limit = "x".into();
        parts.events.post_start.push("missing".into());
        parts.volumes[0].size = "big".into();
        parts.commands.push(exec("build", "app"));
        let errors = check(&parts);
        let kinds: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                AssemblyError::InvalidQuantity { entity, .. } if entity == "metadata" => "metadata",
                AssemblyError::DuplicateName { .. } => "commands",
                AssemblyError::InvalidQuantity { .. } => "volumes",
                AssemblyError::UnresolvedCommandReference { .. } => "events",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["metadata", "commands", "volumes", "events"]);
    }

    #[test]
    fn test_assemble_renders_content() {
        let devfile = assemble(
            metadata(),
            vec![],
            vec![container("app", &[])],
            vec![],
            vec![],
            vec![],
            Events::default(),
        )
        .unwrap();
        assert_eq!(devfile.version(), DEFAULT_SCHEMA_VERSION);
        assert!(devfile.content().contains("schemaVersion:"));
        assert!(devfile.content().contains("2.2.0"));
        assert!(devfile.content().contains("name: app"));
    }
}
