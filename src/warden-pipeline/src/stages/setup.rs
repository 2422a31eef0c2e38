//! First-time setup gate.

use async_trait::async_trait;

use crate::error::ConfigurationFault;
use crate::gate::{CancelReason, Gate, GateContext, Verdict};

/// Diverts every message to the setup flow until setup is complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupGate;

#[async_trait]
impl Gate for SetupGate {
    fn name(&self) -> &'static str {
        "setup"
    }

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        if ctx.installer.is_installed().await {
            return Ok(Verdict::Continue);
        }
        ctx.installer.divert(ctx.message, ctx.notifier).await;
        Ok(Verdict::Cancel(CancelReason::SetupPending))
    }
}
