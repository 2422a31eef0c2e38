//! Async entry points that read the store and hand off to warden-policy.

use std::collections::BTreeSet;

use tracing::debug;
use warden_policy::{
    Access, Authority, EffectiveAllowSet, ExternalId, PermissionResolver, PermissionSnapshot,
    RoleRef, Unresolvable, compare_authority,
};

use crate::error::StoreResult;
use crate::store::PermissionStore;

/// Captures everything the resolver needs for one user.
pub async fn load_snapshot<S>(store: &S, external_id: ExternalId) -> StoreResult<PermissionSnapshot>
where
    S: PermissionStore + ?Sized,
{
    let Some(user) = store.get_user(external_id).await? else {
        return Ok(PermissionSnapshot::default());
    };

    let roles = store.get_roles_of(user.id).await?;
    let priorities = store.get_role_priorities().await?;
    let rules = store.get_permission_rules().await?;

    debug!(
        external_id = %external_id,
        roles = roles.len(),
        rules = rules.len(),
        "loaded permission snapshot"
    );

    Ok(PermissionSnapshot {
        user_id: Some(user.id),
        roles,
        priorities,
        rules,
    })
}

/// Effective allow set of a user, computed from current store state.
pub async fn resolve_for<S>(
    store: &S,
    external_id: ExternalId,
) -> StoreResult<Result<EffectiveAllowSet, Unresolvable>>
where
    S: PermissionStore + ?Sized,
{
    let snapshot = load_snapshot(store, external_id).await?;
    Ok(PermissionResolver::resolve(&snapshot))
}

/// Decides whether a user may run `command`.
pub async fn check_access<S>(store: &S, external_id: ExternalId, command: &str) -> StoreResult<Access>
where
    S: PermissionStore + ?Sized,
{
    // Access::decide rejects empty names too; returning here skips the store reads.
    if command.is_empty() {
        return Ok(Access::Unresolvable);
    }
    let snapshot = load_snapshot(store, external_id).await?;
    Ok(Access::check(&snapshot, command))
}

/// Roles of a user, `None` when the user is unknown or holds no roles.
pub async fn roles_of<S>(store: &S, external_id: ExternalId) -> StoreResult<Option<BTreeSet<RoleRef>>>
where
    S: PermissionStore + ?Sized,
{
    let Some(user) = store.get_user(external_id).await? else {
        return Ok(None);
    };
    let roles = store.get_roles_of(user.id).await?;
    Ok((!roles.is_empty()).then_some(roles))
}

/// Compares two users by the most senior role each holds.
pub async fn compare_users<S>(
    store: &S,
    first: ExternalId,
    second: ExternalId,
) -> StoreResult<Result<Authority, Unresolvable>>
where
    S: PermissionStore + ?Sized,
{
    let (Some(a), Some(b)) = (roles_of(store, first).await?, roles_of(store, second).await?) else {
        return Ok(Err(Unresolvable::NoRoles));
    };
    let priorities = store.get_role_priorities().await?;
    Ok(compare_authority(&a, &b, &priorities))
}
