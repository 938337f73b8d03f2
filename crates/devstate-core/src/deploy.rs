//! # Deployment Policy
//!
//! `DeployByDefault` decides whether a resource (or image, via `autoBuild`)
//! is deployed automatically when the workspace starts. It is a closed set
//! of exactly three values; any other string is rejected at the validation
//! boundary rather than carried through as an opaque label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Automatic deployment policy for a resource or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployByDefault {
    /// Never deployed automatically; only through an explicit apply command.
    Never,
    /// No explicit policy: inherit the caller's policy.
    #[default]
    Undefined,
    /// Always deployed when the workspace starts.
    Always,
}

impl DeployByDefault {
    /// All variants in wire order.
    pub const ALL: [DeployByDefault; 3] = [Self::Never, Self::Undefined, Self::Always];

    /// The wire names accepted by serde and [`FromStr`].
    pub fn wire_names() -> &'static [&'static str] {
        &["never", "undefined", "always"]
    }

    /// The wire name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Undefined => "undefined",
            Self::Always => "always",
        }
    }

    /// Resolve the policy to a decision, letting `Undefined` inherit
    /// `inherited`.
    pub fn resolve(self, inherited: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Undefined => inherited,
            Self::Always => true,
        }
    }
}

impl fmt::Display for DeployByDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployByDefault {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "undefined" => Ok(Self::Undefined),
            "always" => Ok(Self::Always),
            other => Err(CoreError::UnknownVariant {
                enum_name: "DeployByDefault",
                value: other.to_string(),
                allowed: Self::wire_names(),
            }),
        }
    }
}
