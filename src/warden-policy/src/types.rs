//! Identifier and rule types shared by the resolver and the store layer.
//!
//! The store layer is untyped (rows of strings and integers). These wrappers
//! keep a role name from being compared with a command name, or a surrogate
//! user id with a platform id.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

int_id!(
    /// Platform-side user identity (the messenger's user id).
    ExternalId
);
int_id!(
    /// Internal surrogate id assigned by the store on first contact.
    UserId
);
int_id!(
    /// Conversation id. Non-positive ids are groups and channels.
    ChatId
);
int_id!(
    /// Role priority. Higher means more authority.
    Priority
);

impl ChatId {
    /// Returns true for group/channel style conversations.
    pub fn is_group_like(&self) -> bool {
        self.0 <= 0
    }
}

/// Name of a bot command, without the leading slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Wildcard command matching every command name.
    pub const ALL: &'static str = "all";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for CommandName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Reference to a role by its unique name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRef(String);

impl RoleRef {
    /// Name of the role that passes the maintenance (debug) gate.
    pub const ADMIN: &'static str = "admin";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who a permission rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    /// Personal override for one user.
    User(UserId),
    /// Every holder of a role.
    Role(RoleRef),
}

/// Polarity of a permission rule together with the command it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    Allow(CommandName),
    Deny(CommandName),
}

impl RuleEffect {
    pub fn command(&self) -> &CommandName {
        match self {
            RuleEffect::Allow(command) | RuleEffect::Deny(command) => command,
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, RuleEffect::Deny(_))
    }
}

/// A validated permission rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRule {
    pub target: RuleTarget,
    pub effect: RuleEffect,
}

impl PermissionRule {
    pub fn allow_role(role: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            target: RuleTarget::Role(RoleRef::new(role)),
            effect: RuleEffect::Allow(CommandName::new(command)),
        }
    }

    pub fn deny_role(role: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            target: RuleTarget::Role(RoleRef::new(role)),
            effect: RuleEffect::Deny(CommandName::new(command)),
        }
    }

    pub fn allow_user(user: UserId, command: impl Into<String>) -> Self {
        Self {
            target: RuleTarget::User(user),
            effect: RuleEffect::Allow(CommandName::new(command)),
        }
    }

    pub fn deny_user(user: UserId, command: impl Into<String>) -> Self {
        Self {
            target: RuleTarget::User(user),
            effect: RuleEffect::Deny(CommandName::new(command)),
        }
    }
}

/// Untyped permission row as kept by a relational store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPermissionRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_role: Option<RoleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_command: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<RawPermissionRow> for PermissionRule {
    type Error = RuleError;

    /// A non-empty deny value makes the row a deny rule; otherwise the allow
    /// value is used.
    fn try_from(row: RawPermissionRow) -> Result<Self, Self::Error> {
        let target = match (row.for_user, row.for_role) {
            (Some(user), None) => RuleTarget::User(user),
            (None, Some(role)) => RuleTarget::Role(role),
            (Some(_), Some(_)) => return Err(RuleError::AmbiguousTarget),
            (None, None) => return Err(RuleError::MissingTarget),
        };

        let effect = match (non_empty(row.deny_command), non_empty(row.allow_command)) {
            (Some(deny), _) => RuleEffect::Deny(CommandName::new(deny)),
            (None, Some(allow)) => RuleEffect::Allow(CommandName::new(allow)),
            (None, None) => return Err(RuleError::MissingCommand),
        };

        Ok(Self { target, effect })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_value_decides_polarity() {
        let row = RawPermissionRow {
            for_role: Some(RoleRef::new("student")),
            allow_command: Some("start".to_string()),
            deny_command: Some("ban".to_string()),
            ..Default::default()
        };
        let rule = PermissionRule::try_from(row).unwrap();
        assert_eq!(rule.effect, RuleEffect::Deny(CommandName::new("ban")));
    }

    #[test]
    fn test_empty_deny_falls_back_to_allow() {
        let row = RawPermissionRow {
            for_user: Some(UserId(7)),
            allow_command: Some("home".to_string()),
            deny_command: Some(String::new()),
            ..Default::default()
        };
        let rule = PermissionRule::try_from(row).unwrap();
        assert_eq!(rule.target, RuleTarget::User(UserId(7)));
        assert_eq!(rule.effect, RuleEffect::Allow(CommandName::new("home")));
    }

    #[test]
    fn test_target_must_be_exactly_one() {
        let both = RawPermissionRow {
            for_user: Some(UserId(1)),
            for_role: Some(RoleRef::admin()),
            allow_command: Some("all".to_string()),
            deny_command: None,
        };
        assert_eq!(
            PermissionRule::try_from(both),
            Err(RuleError::AmbiguousTarget)
        );

        let neither = RawPermissionRow {
            allow_command: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(
            PermissionRule::try_from(neither),
            Err(RuleError::MissingTarget)
        );
    }

    #[test]
    fn test_row_without_command_is_rejected() {
        let row = RawPermissionRow {
            for_role: Some(RoleRef::admin()),
            allow_command: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(PermissionRule::try_from(row), Err(RuleError::MissingCommand));
    }

    #[test]
    fn test_chat_id_group_like() {
        assert!(ChatId(-100123).is_group_like());
        assert!(ChatId(0).is_group_like());
        assert!(!ChatId(42).is_group_like());
    }

    #[test]
    fn test_wildcard_command() {
        assert!(CommandName::all().is_wildcard());
        assert!(!CommandName::new("kick").is_wildcard());
    }
}
