//! Identity announced to the relay.
//!
//! Every peer introduces itself with a `boardInfo` frame right after the
//! socket opens. The relay uses the role to decide which traffic the peer
//! receives and the name to address it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a peer plays on the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The control point issuing playback commands.
    Editor,
    /// A remote performer device.
    Dancer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Editor => "editor",
            Role::Dancer => "dancer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(Role::Editor),
            "dancer" => Ok(Role::Dancer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Error parsing a role string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(String);

/// Payload of the `boardInfo` announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub role: Role,
    pub name: String,
}

impl Identity {
    /// Create an editor identity.
    pub fn editor(name: impl Into<String>) -> Self {
        Self {
            role: Role::Editor,
            name: name.into(),
        }
    }

    /// Check if this identity belongs to an editor.
    pub fn is_editor(&self) -> bool {
        self.role == Role::Editor
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.name)
    }
}
