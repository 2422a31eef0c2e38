//! Line-delimited JSON records written to stdout.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;
use warden_pipeline::{Notifier, NotifyOptions, NotifyTarget, Outcome};

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    /// A notice the pipeline sent to a sender.
    Notice {
        target: NotifyTarget,
        text: String,
        #[serde(flatten)]
        options: NotifyOptions,
    },
    /// Final decision for an inbound message.
    Outcome { message_id: i64, outcome: Outcome },
}

/// Notifier forwarding notices to the output writer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Record>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Record>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, target: NotifyTarget, text: &str, options: &NotifyOptions) {
        let record = Record::Notice {
            target,
            text: text.to_string(),
            options: options.clone(),
        };
        if self.tx.send(record).is_err() {
            warn!("output closed, dropping notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_pipeline::CancelReason;
    use warden_policy::ChatId;

    #[test]
    fn test_record_serialization() {
        let notice = Record::Notice {
            target: NotifyTarget::Chat(ChatId(5)),
            text: "hi".to_string(),
            options: NotifyOptions::reply_to(3),
        };
        assert_eq!(
            serde_json::to_string(&notice).unwrap(),
            r#"{"type":"notice","target":{"kind":"chat","id":5},"text":"hi","reply_to":3}"#
        );

        let outcome = Record::Outcome {
            message_id: 3,
            outcome: Outcome::Cancelled(CancelReason::AccessDenied),
        };
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"type":"outcome","message_id":3,"outcome":{"outcome":"cancelled","reason":"access_denied"}}"#
        );
    }
}
