//! Gate abstraction shared by the pipeline stages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use warden_policy::ExternalId;
use warden_store::PermissionStore;

use crate::audit::AuditSink;
use crate::config::PipelineConfig;
use crate::error::ConfigurationFault;
use crate::install::Installer;
use crate::message::InboundMessage;
use crate::notify::{NotifyOptions, NotifyTarget, Notifier};
use crate::settings::SettingsSnapshot;

/// Why a message was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    SetupPending,
    RateLimited,
    ForeignChat,
    TermsNotAccepted,
    NotRegistered,
    CommandNotRecognized,
    AccessDenied,
    Maintenance,
}

/// Result of a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Cancel(CancelReason),
}

/// Everything a gate may read or touch during one pipeline run.
pub struct GateContext<'a> {
    pub message: &'a InboundMessage,
    pub store: &'a dyn PermissionStore,
    pub notifier: &'a dyn Notifier,
    pub audit: &'a dyn AuditSink,
    pub installer: &'a dyn Installer,
    pub config: &'a PipelineConfig,
    settings: OnceCell<SettingsSnapshot>,
}

impl<'a> GateContext<'a> {
    pub fn new(
        message: &'a InboundMessage,
        store: &'a dyn PermissionStore,
        notifier: &'a dyn Notifier,
        audit: &'a dyn AuditSink,
        installer: &'a dyn Installer,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            message,
            store,
            notifier,
            audit,
            installer,
            config,
            settings: OnceCell::new(),
        }
    }

    pub fn external_id(&self) -> ExternalId {
        self.message.external_id()
    }

    /// Settings for this run, read from the store on first use.
    pub async fn settings(&self) -> Result<&SettingsSnapshot, ConfigurationFault> {
        self.settings
            .get_or_try_init(|| async {
                SettingsSnapshot::fetch(self.store)
                    .await
                    .map_err(ConfigurationFault::from)
            })
            .await
    }

    /// Reply to the inbound message in its conversation.
    pub async fn reply(&self, text: &str) {
        self.reply_with(text, None).await;
    }

    pub async fn reply_with(&self, text: &str, sticker: Option<String>) {
        let options = NotifyOptions::reply_to(self.message.message_id).with_sticker(sticker);
        self.notifier
            .notify(NotifyTarget::Chat(self.message.chat_id), text, &options)
            .await;
    }
}

/// One stage of the authorization pipeline.
#[async_trait]
pub trait Gate: Send + Sync {
    /// Stage name used in logs and faults.
    fn name(&self) -> &'static str;

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault>;
}
