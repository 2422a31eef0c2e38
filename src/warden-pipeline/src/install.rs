//! First-time setup detection.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::message::InboundMessage;
use crate::notify::{NotifyOptions, NotifyTarget, Notifier};

/// Tells whether initial setup has been completed and routes messages to
/// the setup flow when it has not.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn is_installed(&self) -> bool;

    /// Hand a message to the setup flow.
    async fn divert(&self, message: &InboundMessage, notifier: &dyn Notifier);
}

/// Setup is complete once a marker file exists.
#[derive(Debug, Clone)]
pub struct MarkerFileInstaller {
    marker: PathBuf,
    prompt: String,
}

impl MarkerFileInstaller {
    pub fn new(marker: impl Into<PathBuf>, prompt: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Installer for MarkerFileInstaller {
    async fn is_installed(&self) -> bool {
        tokio::fs::try_exists(&self.marker).await.unwrap_or(false)
    }

    async fn divert(&self, message: &InboundMessage, notifier: &dyn Notifier) {
        debug!(
            external_id = %message.external_id(),
            marker = %self.marker.display(),
            "setup pending, diverting message"
        );
        notifier
            .notify(
                NotifyTarget::Chat(message.chat_id),
                &self.prompt,
                &NotifyOptions::reply_to(message.message_id),
            )
            .await;
    }
}

/// Installer for deployments with no setup flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlreadyInstalled;

#[async_trait]
impl Installer for AlreadyInstalled {
    async fn is_installed(&self) -> bool {
        true
    }

    async fn divert(&self, _message: &InboundMessage, _notifier: &dyn Notifier) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marker_file_presence() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("installed");
        let installer = MarkerFileInstaller::new(&marker, "run setup");

        assert!(!installer.is_installed().await);
        std::fs::write(&marker, "").unwrap();
        assert!(installer.is_installed().await);
    }

    #[tokio::test]
    async fn test_already_installed() {
        assert!(AlreadyInstalled.is_installed().await);
    }
}
