//! Inbound messages as seen by the pipeline.
//!
//! Only the fields the gates read are modelled. Commands follow the usual
//! bot convention: `/name@botname arguments`.

use serde::{Deserialize, Serialize};
use warden_policy::{ChatId, CommandName, ExternalId};

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Platform user id.
    pub external_id: ExternalId,
    /// Display name hint, stored on first contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A message received from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform message id, used for replies.
    pub message_id: i64,
    /// Conversation the message was posted in.
    pub chat_id: ChatId,
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
}

impl InboundMessage {
    pub fn new(message_id: i64, chat_id: ChatId, external_id: ExternalId, text: impl Into<String>) -> Self {
        Self {
            message_id,
            chat_id,
            sender: Sender {
                external_id,
                username: None,
            },
            text: text.into(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.sender.username = Some(username.into());
        self
    }

    /// Check if the text is a command.
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }

    /// Command name without the leading slash or bot mention.
    ///
    /// A bare `/` yields an empty name, which never resolves.
    pub fn command(&self) -> Option<CommandName> {
        if !self.is_command() {
            return None;
        }
        let head = self.text[1..].split_whitespace().next().unwrap_or("");
        let name = head.split('@').next().unwrap_or("");
        Some(CommandName::new(name))
    }

    pub fn external_id(&self) -> ExternalId {
        self.sender.external_id
    }
}
