//! Warden policy - permission resolution for bot commands.
//!
//! Answers whether a user may invoke a command:
//! - `Allowed` - the command (or the `all` wildcard) is in the effective allow set
//! - `Denied` - permissions resolved and the command is absent
//! - `Unresolvable` - reference data is missing, the answer is unknown
//!
//! # Resolution order
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  personal rules (this user)                │  always win
//! └────────────────────┬───────────────────────┘
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │  role tier, highest priority               │  authoritative
//! └────────────────────┬───────────────────────┘
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │  lower tiers                               │  only fill gaps,
//! │  (deny before allow inside a tier)         │  never overturn
//! └────────────────────────────────────────────┘
//! ```
//!
//! Roles sharing a priority value form one tier. Nothing here performs I/O;
//! the store crate captures a [`PermissionSnapshot`] and hands it over.


mod authority;
mod decision;
mod error;
mod resolver;
mod types;

pub use authority::{Authority, compare_authority, highest_priority};
pub use decision::Access;
pub use error::{RuleError, Unresolvable};
pub use resolver::{EffectiveAllowSet, PermissionResolver, PermissionSnapshot};
pub use types::{
    ChatId, CommandName, ExternalId, PermissionRule, Priority, RawPermissionRow, RoleRef,
    RuleEffect, RuleTarget, UserId,
};

/// Resolves the effective allow set for a snapshot.
pub fn resolve(snapshot: &PermissionSnapshot) -> Result<EffectiveAllowSet, Unresolvable> {
    PermissionResolver::resolve(snapshot)
}

/// Decides whether the snapshot's user may run `command`.
pub fn check(snapshot: &PermissionSnapshot, command: &str) -> Access {
    Access::check(snapshot, command)
}
