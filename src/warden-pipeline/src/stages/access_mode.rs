//! Gate applying the deployment access mode.

use async_trait::async_trait;
use tracing::debug;
use warden_policy::{Access, RoleRef};
use warden_store::{ACCESS_MODE_KEY, check_access, roles_of};

use crate::error::ConfigurationFault;
use crate::gate::{CancelReason, Gate, GateContext, Verdict};
use crate::settings::AccessMode;

/// Applies the deployment's access mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessModeGate;

impl AccessModeGate {
    async fn strict(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let external_id = ctx.external_id();
        let user = ctx
            .store
            .get_user(external_id)
            .await?
            .ok_or(ConfigurationFault::UserVanished {
                external_id,
                stage: self.name(),
            })?;

        if !user.is_registered {
            ctx.reply(&ctx.config.messages.registration_required).await;
            return Ok(Verdict::Cancel(CancelReason::NotRegistered));
        }

        let Some(command) = ctx.message.command() else {
            return Ok(Verdict::Continue);
        };

        match check_access(ctx.store, external_id, command.as_str()).await? {
            Access::Allowed => Ok(Verdict::Continue),
            Access::Denied => {
                ctx.reply(&ctx.config.messages.no_access).await;
                ctx.audit.log_denied(external_id, &command).await;
                Ok(Verdict::Cancel(CancelReason::AccessDenied))
            }
            Access::Unresolvable => {
                debug!(external_id = %external_id, command = %command, "command not recognized");
                ctx.reply(&ctx.config.messages.command_not_recognized).await;
                Ok(Verdict::Cancel(CancelReason::CommandNotRecognized))
            }
        }
    }

    async fn debug(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let external_id = ctx.external_id();
        let roles = roles_of(ctx.store, external_id)
            .await?
            .ok_or(ConfigurationFault::RolesUnavailable { external_id })?;

        if roles.contains(&RoleRef::admin()) {
            return Ok(Verdict::Continue);
        }

        let messages = &ctx.config.messages;
        ctx.reply_with(&messages.maintenance, messages.maintenance_sticker.clone())
            .await;
        Ok(Verdict::Cancel(CancelReason::Maintenance))
    }
}

#[async_trait]
impl Gate for AccessModeGate {
    fn name(&self) -> &'static str {
        "access_mode"
    }

    async fn evaluate(&self, ctx: &GateContext<'_>) -> Result<Verdict, ConfigurationFault> {
        let settings = ctx.settings().await?;
        let raw = settings
            .access_mode
            .as_deref()
            .ok_or(ConfigurationFault::MissingSetting(ACCESS_MODE_KEY))?;
        let mode = raw
            .parse::<AccessMode>()
            .map_err(|unknown| ConfigurationFault::UnknownAccessMode(unknown.0))?;

        match mode {
            AccessMode::AllowAll => Ok(Verdict::Continue),
            AccessMode::Strict => self.strict(ctx).await,
            AccessMode::Debug => self.debug(ctx).await,
        }
    }
}
