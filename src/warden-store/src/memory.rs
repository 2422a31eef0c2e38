//! In-memory [`PermissionStore`] used by the binary and by tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use warden_policy::{ExternalId, PermissionRule, Priority, RoleRef, UserId};

use crate::error::{SeedError, StoreError, StoreResult};
use crate::seed::Seed;
use crate::store::{DisplayHints, PermissionStore, User};

#[derive(Debug, Default)]
struct State {
    users: HashMap<ExternalId, User>,
    next_user_id: i64,
    roles: HashMap<RoleRef, Priority>,
    assignments: HashMap<UserId, BTreeSet<RoleRef>>,
    rules: Vec<PermissionRule>,
    settings: HashMap<String, String>,
}

impl State {
    fn insert_user(&mut self, external_id: ExternalId, hints: &DisplayHints) -> UserId {
        if let Some(user) = self.users.get(&external_id) {
            return user.id;
        }
        self.next_user_id += 1;
        let id = UserId(self.next_user_id);
        self.users.insert(
            external_id,
            User {
                id,
                external_id,
                username: hints.username.clone(),
                is_registered: false,
                terms_accepted: false,
            },
        );
        id
    }

    fn user_mut(&mut self, external_id: ExternalId) -> StoreResult<&mut User> {
        self.users
            .get_mut(&external_id)
            .ok_or_else(|| StoreError::Query(format!("user {} not found", external_id)))
    }
}

/// Store keeping all reference data in process memory.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a validated seed.
    pub async fn from_seed(seed: Seed) -> Result<Self, SeedError> {
        let rules = seed.rules()?;
        let store = Self::new();
        {
            let mut state = store.state.write().await;

            for role in &seed.roles {
                let name = RoleRef::new(role.name.clone());
                if state.roles.insert(name, Priority(role.priority)).is_some() {
                    return Err(SeedError::DuplicateRole(role.name.clone()));
                }
            }

            for user in &seed.users {
                let external_id = ExternalId(user.external_id);
                let id = state.insert_user(
                    external_id,
                    &DisplayHints::with_username(user.username.clone()),
                );
                if let Some(record) = state.users.get_mut(&external_id) {
                    record.is_registered = user.registered;
                    record.terms_accepted = user.terms_accepted;
                }
                for role in &user.roles {
                    let role_ref = RoleRef::new(role.clone());
                    if !state.roles.contains_key(&role_ref) {
                        return Err(SeedError::UnknownRole(user.external_id, role.clone()));
                    }
                    state.assignments.entry(id).or_default().insert(role_ref);
                }
            }

            state.rules = rules;
            state.settings = seed.settings.clone();

            debug!(
                roles = state.roles.len(),
                users = state.users.len(),
                rules = state.rules.len(),
                "seeded memory store"
            );
        }
        Ok(store)
    }

    /// Defines a role, replacing the priority of an existing one.
    pub async fn add_role(&self, name: impl Into<String>, priority: i64) {
        let mut state = self.state.write().await;
        state.roles.insert(RoleRef::new(name), Priority(priority));
    }

    /// Ensures a user exists and returns its internal id.
    pub async fn ensure_user(&self, external_id: ExternalId, hints: &DisplayHints) -> UserId {
        self.state.write().await.insert_user(external_id, hints)
    }

    pub async fn assign_role(&self, external_id: ExternalId, role: impl Into<String>) -> StoreResult<()> {
        let role = RoleRef::new(role);
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role) {
            return Err(StoreError::Query(format!("role '{}' not found", role)));
        }
        let id = state.user_mut(external_id)?.id;
        state.assignments.entry(id).or_default().insert(role);
        Ok(())
    }

    pub async fn add_rule(&self, rule: PermissionRule) {
        self.state.write().await.rules.push(rule);
    }

    pub async fn set_setting(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state
            .write()
            .await
            .settings
            .insert(key.into(), value.into());
    }

    pub async fn remove_setting(&self, key: &str) {
        self.state.write().await.settings.remove(key);
    }

    pub async fn set_registered(&self, external_id: ExternalId, registered: bool) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.user_mut(external_id)?.is_registered = registered;
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn get_user(&self, external_id: ExternalId) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&external_id).cloned())
    }

    async fn create_user(
        &self,
        external_id: ExternalId,
        hints: &DisplayHints,
    ) -> StoreResult<()> {
        self.state.write().await.insert_user(external_id, hints);
        Ok(())
    }

    async fn get_roles_of(&self, user_id: UserId) -> StoreResult<BTreeSet<RoleRef>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_role_priorities(&self) -> StoreResult<HashMap<RoleRef, Priority>> {
        Ok(self.state.read().await.roles.clone())
    }

    async fn get_permission_rules(&self) -> StoreResult<Vec<PermissionRule>> {
        Ok(self.state.read().await.rules.clone())
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.state.read().await.settings.get(key).cloned())
    }

    async fn get_terms_accepted(&self, external_id: ExternalId) -> StoreResult<Option<bool>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&external_id)
            .map(|u| u.terms_accepted))
    }

    async fn set_terms_accepted(
        &self,
        external_id: ExternalId,
        accepted: bool,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.user_mut(external_id)?.terms_accepted = accepted;
        Ok(())
    }
}
