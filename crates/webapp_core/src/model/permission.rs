//! Permission decision types.
//!
//! # Responsibility
//! - Define stored (session/persistent) and runtime permission values.
//! - Provide the stable string forms used by manifests and storage.
//!
//! # Invariants
//! - `PROMPT` is representable only in the persistent scope;
//!   the session scope stores `SessionPermission`.
//! - An absent entry (`None`) is the UNSET state; it never has a string
//!   form other than the empty string.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// String form for [`StoredPermission::Allow`].
pub const STORED_PERMISSION_ALLOW: &str = "ALLOW";
/// String form for [`StoredPermission::Deny`].
pub const STORED_PERMISSION_DENY: &str = "DENY";
/// String form for [`StoredPermission::Prompt`].
pub const STORED_PERMISSION_PROMPT: &str = "PROMPT";

/// Decision stored in one permission scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoredPermission {
    Allow,
    Deny,
    Prompt,
}

impl StoredPermission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => STORED_PERMISSION_ALLOW,
            Self::Deny => STORED_PERMISSION_DENY,
            Self::Prompt => STORED_PERMISSION_PROMPT,
        }
    }

    /// Parses the exact upper-case string form.
    pub fn parse(value: &str) -> Result<Self, PermissionValueError> {
        match value {
            STORED_PERMISSION_ALLOW => Ok(Self::Allow),
            STORED_PERMISSION_DENY => Ok(Self::Deny),
            STORED_PERMISSION_PROMPT => Ok(Self::Prompt),
            other => Err(PermissionValueError(other.to_string())),
        }
    }
}

/// Returns the string form of an optional stored permission.
///
/// UNSET maps to an empty string.
pub fn stored_permission_to_string(value: Option<StoredPermission>) -> &'static str {
    value.map_or("", StoredPermission::as_str)
}

/// Decision cacheable in the session scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPermission {
    Allow,
    Deny,
}

impl From<SessionPermission> for StoredPermission {
    fn from(value: SessionPermission) -> Self {
        match value {
            SessionPermission::Allow => Self::Allow,
            SessionPermission::Deny => Self::Deny,
        }
    }
}

/// Permission scope selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionScope {
    /// Volatile, lives as long as the running application.
    Session,
    /// Durable, declared at install time.
    Persistent,
}

/// Access-control answer delivered to the extension boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimePermission {
    AllowSession,
    DenySession,
    AllowForever,
    DenyForever,
    InvalidRuntimePerm,
}

impl RuntimePermission {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::AllowSession | Self::AllowForever)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowSession => "ALLOW_SESSION",
            Self::DenySession => "DENY_SESSION",
            Self::AllowForever => "ALLOW_FOREVER",
            Self::DenyForever => "DENY_FOREVER",
            Self::InvalidRuntimePerm => "INVALID_RUNTIME_PERM",
        }
    }
}

impl Display for RuntimePermission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown stored permission string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionValueError(pub String);

impl Display for PermissionValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "permission value is unsupported: `{}` (expected ALLOW|DENY|PROMPT)",
            self.0
        )
    }
}

impl Error for PermissionValueError {}
