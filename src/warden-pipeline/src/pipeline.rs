//! The authorization pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info};
use warden_store::PermissionStore;

use crate::audit::{AuditSink, TracingAudit};
use crate::config::PipelineConfig;
use crate::error::ConfigurationFault;
use crate::gate::{CancelReason, Gate, GateContext, Verdict};
use crate::install::{AlreadyInstalled, Installer};
use crate::message::InboundMessage;
use crate::notify::{NotifyOptions, NotifyTarget, Notifier};
use crate::ratelimit::RateLimiter;
use crate::stages::default_stages;

/// What happens to a message after the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// Hand the message to the command handlers.
    Dispatch,
    /// Drop the message; any notice has already been sent.
    Cancelled(CancelReason),
}

impl Outcome {
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Outcome::Dispatch)
    }
}

/// Runs every inbound message through the fixed stage list.
///
/// The pipeline holds no per-user state; concurrent calls are independent.
/// The first [`ConfigurationFault`] fires the halt signal and every later
/// call returns [`ConfigurationFault::Halted`].
pub struct AuthorizationPipeline {
    store: Arc<dyn PermissionStore>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditSink>,
    installer: Arc<dyn Installer>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    config: PipelineConfig,
    stages: Vec<Box<dyn Gate>>,
    halt_tx: watch::Sender<bool>,
}

impl AuthorizationPipeline {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        let (halt_tx, _) = watch::channel(false);
        Self {
            store,
            notifier,
            audit: Arc::new(TracingAudit),
            installer: Arc::new(AlreadyInstalled),
            rate_limiter: None,
            config,
            stages: default_stages(),
            halt_tx,
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.installer = installer;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Receiver that flips to `true` when the pipeline halts.
    pub fn subscribe_halt(&self) -> watch::Receiver<bool> {
        self.halt_tx.subscribe()
    }

    pub fn is_halted(&self) -> bool {
        *self.halt_tx.borrow()
    }

    /// Decide whether `message` may be dispatched.
    pub async fn process(&self, message: &InboundMessage) -> Result<Outcome, ConfigurationFault> {
        if self.is_halted() {
            return Err(ConfigurationFault::Halted);
        }

        info!(
            message_id = message.message_id,
            chat_id = %message.chat_id,
            external_id = %message.external_id(),
            username = message.sender.username.as_deref().unwrap_or(""),
            text = %message.text,
            "inbound message"
        );

        if let Some(outcome) = self.throttle(message).await {
            return Ok(outcome);
        }

        let ctx = GateContext::new(
            message,
            self.store.as_ref(),
            self.notifier.as_ref(),
            self.audit.as_ref(),
            self.installer.as_ref(),
            &self.config,
        );

        for stage in &self.stages {
            match stage.evaluate(&ctx).await {
                Ok(Verdict::Continue) => {}
                Ok(Verdict::Cancel(reason)) => {
                    debug!(
                        message_id = message.message_id,
                        stage = stage.name(),
                        ?reason,
                        "message cancelled"
                    );
                    return Ok(Outcome::Cancelled(reason));
                }
                Err(fault) => {
                    self.halt(stage.name(), &fault).await;
                    return Err(fault);
                }
            }
        }

        Ok(Outcome::Dispatch)
    }

    async fn throttle(&self, message: &InboundMessage) -> Option<Outcome> {
        let limiter = self.rate_limiter.as_ref()?;
        let command = message.command()?;
        if !self.config.is_rate_limited(&command) {
            return None;
        }
        if limiter.check(message.external_id(), &command).await {
            return None;
        }

        debug!(external_id = %message.external_id(), command = %command, "rate limited");
        self.notifier
            .notify(
                NotifyTarget::Chat(message.chat_id),
                &self.config.messages.too_many_requests,
                &NotifyOptions::reply_to(message.message_id),
            )
            .await;
        Some(Outcome::Cancelled(CancelReason::RateLimited))
    }

    async fn halt(&self, stage: &'static str, fault: &ConfigurationFault) {
        error!(stage, %fault, "configuration fault, halting");
        self.audit.log_fault(fault).await;
        self.halt_tx.send_replace(true);
    }
}
