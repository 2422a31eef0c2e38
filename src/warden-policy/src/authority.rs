//! Comparison of two users by the most senior role each holds.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Unresolvable;
use crate::types::{Priority, RoleRef};

/// Which side of a comparison holds more authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    First,
    Second,
    Equal,
}

/// Highest priority among `roles`.
pub fn highest_priority(
    roles: &BTreeSet<RoleRef>,
    priorities: &HashMap<RoleRef, Priority>,
) -> Result<Priority, Unresolvable> {
    if roles.is_empty() {
        return Err(Unresolvable::NoRoles);
    }
    if priorities.is_empty() {
        return Err(Unresolvable::NoPriorities);
    }
    let mut best: Option<Priority> = None;
    for role in roles {
        let priority = priorities
            .get(role)
            .copied()
            .ok_or_else(|| Unresolvable::MissingPriority(role.clone()))?;
        best = Some(best.map_or(priority, |b| b.max(priority)));
    }
    best.ok_or(Unresolvable::NoRoles)
}

/// Compares two role sets by their highest priority.
pub fn compare_authority(
    first: &BTreeSet<RoleRef>,
    second: &BTreeSet<RoleRef>,
    priorities: &HashMap<RoleRef, Priority>,
) -> Result<Authority, Unresolvable> {
    let a = highest_priority(first, priorities)?;
    let b = highest_priority(second, priorities)?;
    Ok(match a.cmp(&b) {
        std::cmp::Ordering::Greater => Authority::First,
        std::cmp::Ordering::Less => Authority::Second,
        std::cmp::Ordering::Equal => Authority::Equal,
    })
}
