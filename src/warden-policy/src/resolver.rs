//! Effective permission resolution.
//!
//! ```text
//!  rules ──► personal overrides (always_allow / always_deny)
//!        └─► role tiers keyed by priority value
//!                 │  filtered against the overrides (a personal allow
//!                 │  only cancels role denies, it never grants)
//!                 ▼
//!  highest tier ─► lower tiers: deny merged before allow,
//!                  nothing already decided above is overturned
//!                 ▼
//!          EffectiveAllowSet
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Unresolvable;
use crate::types::{CommandName, PermissionRule, Priority, RoleRef, RuleEffect, RuleTarget, UserId};

/// Everything the resolver reads for one user, captured from the store at one
/// point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    /// Internal id, `None` when the platform id is unknown to the store.
    pub user_id: Option<UserId>,
    /// Roles the user holds.
    pub roles: BTreeSet<RoleRef>,
    /// Priority of every defined role.
    pub priorities: HashMap<RoleRef, Priority>,
    /// All permission rules, in store order.
    pub rules: Vec<PermissionRule>,
}

/// Commands a user may invoke, as computed for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAllowSet {
    commands: BTreeSet<CommandName>,
}

impl EffectiveAllowSet {
    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    /// True when `command` is listed or the wildcard is present.
    pub fn permits(&self, command: &str) -> bool {
        self.contains(CommandName::ALL) || self.contains(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandName> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<CommandName> for EffectiveAllowSet {
    fn from_iter<I: IntoIterator<Item = CommandName>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default)]
struct PersonalOverrides {
    always_allow: BTreeSet<CommandName>,
    always_deny: BTreeSet<CommandName>,
}

/// Allow and deny lists of every role sharing one priority value.
#[derive(Debug, Clone, Default)]
struct Tier {
    allow: Vec<CommandName>,
    deny: Vec<CommandName>,
}

impl Tier {
    fn without_overrides(&self, overrides: &PersonalOverrides) -> Tier {
        Tier {
            allow: self
                .allow
                .iter()
                .filter(|c| !overrides.always_deny.contains(*c))
                .cloned()
                .collect(),
            deny: self
                .deny
                .iter()
                .filter(|c| !overrides.always_allow.contains(*c))
                .cloned()
                .collect(),
        }
    }
}

/// Merges personal overrides and role tiers into an effective allow set.
pub struct PermissionResolver;

impl PermissionResolver {
    /// Resolves the effective allow set for the user captured in `snapshot`.
    pub fn resolve(snapshot: &PermissionSnapshot) -> Result<EffectiveAllowSet, Unresolvable> {
        let user_id = snapshot.user_id.ok_or(Unresolvable::UnknownUser)?;
        if snapshot.roles.is_empty() {
            return Err(Unresolvable::NoRoles);
        }
        if snapshot.priorities.is_empty() {
            return Err(Unresolvable::NoPriorities);
        }
        if snapshot.rules.is_empty() {
            return Err(Unresolvable::NoRules);
        }

        let overrides = Self::collect_overrides(user_id, &snapshot.rules);
        let tiers = Self::collect_tiers(snapshot)?;

        let mut final_allow: BTreeSet<CommandName> = BTreeSet::new();
        let mut final_deny: BTreeSet<CommandName> = BTreeSet::new();

        // Highest priority first. Against an empty final set the first tier
        // lands as-is apart from its own allow/deny conflicts.
        for (priority, tier) in tiers.iter().rev() {
            let tier = tier.without_overrides(&overrides);

            for command in tier.deny {
                if !final_allow.contains(&command) {
                    final_deny.insert(command);
                }
            }
            for command in tier.allow {
                if !final_deny.contains(&command) {
                    final_allow.insert(command);
                }
            }

            debug!(
                user_id = %user_id,
                priority = %priority,
                allowed = final_allow.len(),
                denied = final_deny.len(),
                "merged permission tier"
            );
        }

        Ok(EffectiveAllowSet {
            commands: final_allow,
        })
    }

    fn collect_overrides(user_id: UserId, rules: &[PermissionRule]) -> PersonalOverrides {
        let mut overrides = PersonalOverrides::default();
        for rule in rules {
            if rule.target != RuleTarget::User(user_id) {
                continue;
            }
            match &rule.effect {
                RuleEffect::Deny(command) => {
                    overrides.always_deny.insert(command.clone());
                }
                RuleEffect::Allow(command) => {
                    overrides.always_allow.insert(command.clone());
                }
            }
        }
        overrides
    }

    /// Buckets role rules by the priority value of the role, so roles with
    /// equal priority share one tier. Both lists exist for every tier.
    fn collect_tiers(
        snapshot: &PermissionSnapshot,
    ) -> Result<BTreeMap<Priority, Tier>, Unresolvable> {
        let mut tiers: BTreeMap<Priority, Tier> = BTreeMap::new();

        for rule in &snapshot.rules {
            let RuleTarget::Role(role) = &rule.target else {
                continue;
            };
            if !snapshot.roles.contains(role) {
                continue;
            }
            let priority = *snapshot
                .priorities
                .get(role)
                .ok_or_else(|| Unresolvable::MissingPriority(role.clone()))?;

            let tier = tiers.entry(priority).or_default();
            match &rule.effect {
                RuleEffect::Allow(command) => tier.allow.push(command.clone()),
                RuleEffect::Deny(command) => tier.deny.push(command.clone()),
            }
        }

        Ok(tiers)
    }
}
