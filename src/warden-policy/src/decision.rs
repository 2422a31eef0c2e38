//! Access decision types.

use serde::{Deserialize, Serialize};

use crate::error::Unresolvable;
use crate::resolver::{EffectiveAllowSet, PermissionResolver, PermissionSnapshot};

/// Answer to "may this user run this command".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// The command is in the effective allow set (or the wildcard is).
    Allowed,
    /// Permissions resolved and the command is not among them.
    Denied,
    /// Permissions could not be determined from the reference data.
    Unresolvable,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// Decides against an already resolved allow set.
    pub fn decide(
        command: &str,
        resolved: Result<&EffectiveAllowSet, &Unresolvable>,
    ) -> Access {
        if command.is_empty() {
            return Access::Unresolvable;
        }
        match resolved {
            Err(_) => Access::Unresolvable,
            Ok(set) if set.permits(command) => Access::Allowed,
            Ok(_) => Access::Denied,
        }
    }

    /// Resolves `snapshot` and decides for `command`.
    pub fn check(snapshot: &PermissionSnapshot, command: &str) -> Access {
        let resolved = PermissionResolver::resolve(snapshot);
        Access::decide(command, resolved.as_ref())
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Allowed => write!(f, "ALLOWED"),
            Access::Denied => write!(f, "DENIED"),
            Access::Unresolvable => write!(f, "UNRESOLVABLE"),
        }
    }
}
