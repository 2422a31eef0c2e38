//! Outbound notices to the sender.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_policy::ChatId;

/// Where a notice is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NotifyTarget {
    Chat(ChatId),
}

/// Delivery options for a notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyOptions {
    /// Message id to reply to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,
    /// Sticker sent alongside the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
}

impl NotifyOptions {
    pub fn reply_to(message_id: i64) -> Self {
        Self {
            reply_to: Some(message_id),
            sticker: None,
        }
    }

    pub fn with_sticker(mut self, sticker: Option<String>) -> Self {
        self.sticker = sticker;
        self
    }
}

/// Sends notices back to the platform.
///
/// Delivery is best effort; implementations log their own failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: NotifyTarget, text: &str, options: &NotifyOptions);
}
