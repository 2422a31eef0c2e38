//! The store contract consumed by the authorization core.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_policy::{ExternalId, PermissionRule, Priority, RoleRef, UserId};

use crate::error::StoreResult;

/// Setting holding the access mode (`allow_all`, `strict`, `debug`).
pub const ACCESS_MODE_KEY: &str = "access_mode";

/// Setting holding the terms-of-service text.
pub const TERMS_TEXT_KEY: &str = "terms_text";

/// A bot user as known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub terms_accepted: bool,
}

/// Profile details available when a user is first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHints {
    pub username: Option<String>,
}

impl DisplayHints {
    pub fn with_username(username: Option<String>) -> Self {
        Self { username }
    }
}

/// Read access to users, roles, rules and settings.
///
/// Every call reads the latest committed state; the core never caches
/// results between requests.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Looks a user up by platform id.
    async fn get_user(&self, external_id: ExternalId) -> StoreResult<Option<User>>;

    /// Creates a user with `is_registered = false` and `terms_accepted = false`.
    /// Creating an existing user is a no-op.
    async fn create_user(&self, external_id: ExternalId, hints: &DisplayHints)
    -> StoreResult<()>;

    /// Roles held by a user.
    async fn get_roles_of(&self, user_id: UserId) -> StoreResult<BTreeSet<RoleRef>>;

    /// Priority of every defined role.
    async fn get_role_priorities(&self) -> StoreResult<HashMap<RoleRef, Priority>>;

    /// All permission rules, in store order.
    async fn get_permission_rules(&self) -> StoreResult<Vec<PermissionRule>>;

    /// A global setting, `None` when the row is missing.
    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>>;

    /// Terms acceptance, `None` when the user is unknown.
    async fn get_terms_accepted(&self, external_id: ExternalId) -> StoreResult<Option<bool>>;

    async fn set_terms_accepted(&self, external_id: ExternalId, accepted: bool)
    -> StoreResult<()>;
}
