//! Audit trail for denied attempts and configuration faults.

use async_trait::async_trait;
use tracing::{error, warn};
use warden_policy::{CommandName, ExternalId};

use crate::error::ConfigurationFault;

/// Receives security-relevant pipeline events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// A command was refused by the access decision.
    async fn log_denied(&self, external_id: ExternalId, command: &CommandName);

    /// A configuration fault stopped the pipeline.
    async fn log_fault(&self, fault: &ConfigurationFault);
}

/// Audit sink writing to the `warden::audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

#[async_trait]
impl AuditSink for TracingAudit {
    async fn log_denied(&self, external_id: ExternalId, command: &CommandName) {
        warn!(
            target: "warden::audit",
            external_id = %external_id,
            command = %command,
            "access denied"
        );
    }

    async fn log_fault(&self, fault: &ConfigurationFault) {
        error!(target: "warden::audit", %fault, "configuration fault");
    }
}
