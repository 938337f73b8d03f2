//! # Commands
//!
//! Commands are the named actions a devfile offers: run a command line in a
//! container (exec), deploy an image or resource (apply), build an image
//! (image), or run other commands in sequence or in parallel (composite).
//!
//! A command is exactly one of these kinds. On the wire the kind is the key
//! that carries its payload:
//!
//! ```text
//! { "name": "run", "group": "run", "default": true,
//!   "exec": { "component": "runtime", "commandLine": "npm start" } }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A named devfile command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Command name, unique among the commands of a devfile.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,
    /// Whether this is the default command of its group.
    #[serde(default)]
    pub default: bool,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    /// An ungrouped, non-default command.
    pub fn new(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            group: None,
            default: false,
            kind,
        }
    }

    /// Place the command in `group`.
    pub fn in_group(mut self, group: CommandGroup, default: bool) -> Self {
        self.group = Some(group);
        self.default = default;
        self
    }
}

/// The action a command performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Exec(ExecCommand),
    Apply(ApplyCommand),
    Image(ImageCommand),
    Composite(CompositeCommand),
}

impl CommandKind {
    /// Wire key of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exec(_) => "exec",
            Self::Apply(_) => "apply",
            Self::Image(_) => "image",
            Self::Composite(_) => "composite",
        }
    }

    /// The wire keys of all kinds.
    pub fn wire_names() -> &'static [&'static str] {
        &["exec", "apply", "image", "composite"]
    }
}

/// Run a command line inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCommand {
    /// Name of the container the command runs in.
    pub component: String,
    pub command_line: String,
    pub working_dir: String,
    /// Whether the running process picks up source changes by itself.
    pub hot_reload_capable: bool,
}

/// Deploy an image or resource component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCommand {
    /// Name of the image or resource to apply.
    pub component: String,
}

/// Build an image component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCommand {
    /// Name of the image to build.
    pub component: String,
}

/// Run other commands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeCommand {
    /// Names of the commands to run, in order.
    pub commands: Vec<String>,
    /// Run the commands concurrently instead of in order.
    pub parallel: bool,
}

/// The lifecycle group a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandGroup {
    Build,
    Run,
    Test,
    Debug,
    Deploy,
}

impl CommandGroup {
    pub const ALL: [CommandGroup; 5] = [Self::Build, Self::Run, Self::Test, Self::Debug, Self::Deploy];

    pub fn wire_names() -> &'static [&'static str] {
        &["build", "run", "test", "debug", "deploy"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Run => "run",
            Self::Test => "test",
            Self::Debug => "debug",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                enum_name: "CommandGroup",
                value: s.to_string(),
                allowed: Self::wire_names(),
            })
    }
}
