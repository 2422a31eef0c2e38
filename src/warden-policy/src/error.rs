//! Error types for the permission engine.

use thiserror::Error;

use crate::types::RoleRef;

/// A store row that cannot become a [`crate::PermissionRule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Row targets both a user and a role
    #[error("permission row targets both a user and a role")]
    AmbiguousTarget,

    /// Row targets neither a user nor a role
    #[error("permission row targets neither a user nor a role")]
    MissingTarget,

    /// Row carries neither an allow nor a deny command
    #[error("permission row has no command")]
    MissingCommand,
}

/// Why the effective permissions of a user could not be determined.
///
/// Distinct from an empty allow set: this points at missing or orphaned
/// reference data, not at a legitimate denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolvable {
    #[error("user has no internal id")]
    UnknownUser,

    #[error("user holds no roles")]
    NoRoles,

    #[error("no role priorities are defined")]
    NoPriorities,

    #[error("no permission rules are defined")]
    NoRules,

    #[error("role '{0}' has no priority")]
    MissingPriority(RoleRef),
}
