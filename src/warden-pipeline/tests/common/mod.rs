//! Shared fixtures for pipeline behaviour tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use warden_pipeline::{
    AuditSink, AuthorizationPipeline, ConfigurationFault, InboundMessage, Notifier, NotifyOptions,
    NotifyTarget, PipelineConfig,
};
use warden_policy::{ChatId, CommandName, ExternalId, PermissionRule, Priority, RoleRef, UserId};
use warden_store::{
    DisplayHints, MemoryStore, PermissionStore, Seed, StoreError, StoreResult, User,
};

pub const ADMIN: ExternalId = ExternalId(100);
pub const STUDENT: ExternalId = ExternalId(200);
pub const UNREGISTERED: ExternalId = ExternalId(300);
pub const ROLELESS: ExternalId = ExternalId(400);

pub const ADMIN_CHAT: ChatId = ChatId(-100);
pub const TERMS: &str = "Be kind to each other.";
pub const STICKER: &str = "maintenance-sticker";

const SEED: &str = r#"
[settings]
terms_text = "Be kind to each other."

[[roles]]
name = "admin"
priority = 100

[[roles]]
name = "student"
priority = 10

[[users]]
external_id = 100
roles = ["admin"]
registered = true
terms_accepted = true

[[users]]
external_id = 200
roles = ["student"]
registered = true
terms_accepted = true

[[users]]
external_id = 300
roles = ["student"]
terms_accepted = true

[[users]]
external_id = 400
registered = true
terms_accepted = true

[[permissions]]
for_role = "admin"
allow_command = "all"

[[permissions]]
for_role = "student"
allow_command = "start"

[[permissions]]
for_role = "student"
deny_command = "mailing"
"#;

/// A notice captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub target: NotifyTarget,
    pub text: String,
    pub options: NotifyOptions,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.text).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, target: NotifyTarget, text: &str, options: &NotifyOptions) {
        self.sent.lock().unwrap().push(Notice {
            target,
            text: text.to_string(),
            options: options.clone(),
        });
    }
}

#[derive(Debug, Default)]
pub struct RecordingAudit {
    denied: Mutex<Vec<(ExternalId, CommandName)>>,
    faults: Mutex<Vec<String>>,
}

impl RecordingAudit {
    pub fn denied(&self) -> Vec<(ExternalId, CommandName)> {
        self.denied.lock().unwrap().clone()
    }

    pub fn faults(&self) -> Vec<String> {
        self.faults.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn log_denied(&self, external_id: ExternalId, command: &CommandName) {
        self.denied.lock().unwrap().push((external_id, command.clone()));
    }

    async fn log_fault(&self, fault: &ConfigurationFault) {
        self.faults.lock().unwrap().push(fault.to_string());
    }
}

/// Which read a [`VanishingStore`] pretends finds no user.
#[derive(Debug, Clone, Copy)]
pub enum Vanish {
    Terms,
    User,
}

/// Store whose user record disappears between stages.
pub struct VanishingStore {
    pub inner: MemoryStore,
    pub vanish: Vanish,
}

#[async_trait]
impl PermissionStore for VanishingStore {
    async fn get_user(&self, external_id: ExternalId) -> StoreResult<Option<User>> {
        match self.vanish {
            Vanish::User => Ok(None),
            Vanish::Terms => self.inner.get_user(external_id).await,
        }
    }

    async fn create_user(&self, external_id: ExternalId, hints: &DisplayHints) -> StoreResult<()> {
        self.inner.create_user(external_id, hints).await
    }

    async fn get_roles_of(&self, user_id: UserId) -> StoreResult<BTreeSet<RoleRef>> {
        self.inner.get_roles_of(user_id).await
    }

    async fn get_role_priorities(&self) -> StoreResult<HashMap<RoleRef, Priority>> {
        self.inner.get_role_priorities().await
    }

    async fn get_permission_rules(&self) -> StoreResult<Vec<PermissionRule>> {
        self.inner.get_permission_rules().await
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get_setting(key).await
    }

    async fn get_terms_accepted(&self, external_id: ExternalId) -> StoreResult<Option<bool>> {
        match self.vanish {
            Vanish::Terms => Ok(None),
            Vanish::User => self.inner.get_terms_accepted(external_id).await,
        }
    }

    async fn set_terms_accepted(&self, external_id: ExternalId, accepted: bool) -> StoreResult<()> {
        self.inner.set_terms_accepted(external_id, accepted).await
    }
}

/// Store whose backend is unreachable.
pub struct UnavailableStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl PermissionStore for UnavailableStore {
    async fn get_user(&self, _: ExternalId) -> StoreResult<Option<User>> {
        unavailable()
    }

    async fn create_user(&self, _: ExternalId, _: &DisplayHints) -> StoreResult<()> {
        unavailable()
    }

    async fn get_roles_of(&self, _: UserId) -> StoreResult<BTreeSet<RoleRef>> {
        unavailable()
    }

    async fn get_role_priorities(&self) -> StoreResult<HashMap<RoleRef, Priority>> {
        unavailable()
    }

    async fn get_permission_rules(&self) -> StoreResult<Vec<PermissionRule>> {
        unavailable()
    }

    async fn get_setting(&self, _: &str) -> StoreResult<Option<String>> {
        unavailable()
    }

    async fn get_terms_accepted(&self, _: ExternalId) -> StoreResult<Option<bool>> {
        unavailable()
    }

    async fn set_terms_accepted(&self, _: ExternalId, _: bool) -> StoreResult<()> {
        unavailable()
    }
}

pub async fn seeded_store(access_mode: Option<&str>) -> MemoryStore {
    let store = MemoryStore::from_seed(Seed::parse(SEED).unwrap())
        .await
        .unwrap();
    if let Some(mode) = access_mode {
        store.set_setting("access_mode", mode).await;
    }
    store
}

pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig {
        admin_chat_id: Some(ADMIN_CHAT),
        ..Default::default()
    };
    config.messages.maintenance_sticker = Some(STICKER.to_string());
    config
}

/// Pipeline wired to recording doubles.
pub struct Harness {
    pub pipeline: AuthorizationPipeline,
    pub notifier: Arc<RecordingNotifier>,
    pub audit: Arc<RecordingAudit>,
}

impl Harness {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let audit = Arc::new(RecordingAudit::default());
        let pipeline = AuthorizationPipeline::new(store, notifier.clone(), test_config())
            .with_audit(audit.clone());
        Self {
            pipeline,
            notifier,
            audit,
        }
    }

    pub async fn with_mode(access_mode: &str) -> (Self, MemoryStore) {
        let store = seeded_store(Some(access_mode)).await;
        (Self::new(Arc::new(store.clone())), store)
    }
}

/// Message from `user` in their private chat.
pub fn private(user: ExternalId, text: &str) -> InboundMessage {
    InboundMessage::new(1, ChatId(user.0), user, text)
}
