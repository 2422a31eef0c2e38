//! User record creation on first contact.

use async_trait::async_trait;
use tracing::debug;
use warden_store::DisplayHints;

use crate::error::ConfigurationFault;
use crate::gate::{Gate, GateContext, Verdict};

/// Creates the sender's user record on first contact. Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertStage;

#[async_trait]
impl Gate for UpsertStage {
    fn name(&self) -> &'static str {
        "upsert"
    }

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let external_id = ctx.external_id();
        if ctx.store.get_user(external_id).await?.is_none() {
            let hints = DisplayHints::with_username(ctx.message.sender.username.clone());
            ctx.store.create_user(external_id, &hints).await?;
            debug!(external_id = %external_id, "created user on first contact");
        }
        Ok(Verdict::Continue)
    }
}
