//! Terms-of-use gate.

use async_trait::async_trait;
use tracing::info;

use crate::error::ConfigurationFault;
use crate::gate::{CancelReason, Gate, GateContext, Verdict};

/// Requires acceptance of the terms of use.
///
/// Sending the accept phrase records acceptance and lets the same message
/// continue through the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermsGate;

#[async_trait]
impl Gate for TermsGate {
    fn name(&self) -> &'static str {
        "terms"
    }

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let external_id = ctx.external_id();
        let accepted = ctx
            .store
            .get_terms_accepted(external_id)
            .await?
            .ok_or(ConfigurationFault::UserVanished {
                external_id,
                stage: self.name(),
            })?;

        let settings = ctx.settings().await?;
        let terms_text = settings
            .terms_text()
            .ok_or(ConfigurationFault::MissingTermsText)?;

        if accepted {
            return Ok(Verdict::Continue);
        }

        if ctx.message.text == ctx.config.accept_phrase {
            ctx.store.set_terms_accepted(external_id, true).await?;
            info!(external_id = %external_id, "terms of use accepted");
            return Ok(Verdict::Continue);
        }

        ctx.reply(terms_text).await;
        ctx.reply(&ctx.config.messages.terms_prompt_for(&ctx.config.accept_phrase))
            .await;
        Ok(Verdict::Cancel(CancelReason::TermsNotAccepted))
    }
}
