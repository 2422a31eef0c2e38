//! Scope gate for group conversations.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ConfigurationFault;
use crate::gate::{CancelReason, Gate, GateContext, Verdict};

/// Ignores group conversations other than the configured admin and
/// support chats. Private chats always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeGate;

#[async_trait]
impl Gate for ScopeGate {
    fn name(&self) -> &'static str {
        "scope"
    }

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let chat_id = ctx.message.chat_id;
        if chat_id.is_group_like() && !ctx.config.is_allowed_group(chat_id) {
            debug!(chat_id = %chat_id, "ignoring message from foreign group");
            return Ok(Verdict::Cancel(CancelReason::ForeignChat));
        }
        Ok(Verdict::Continue)
    }
}
