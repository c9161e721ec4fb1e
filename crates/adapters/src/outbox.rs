//! Outbox messenger for review-before-delivery mode.

use async_trait::async_trait;
use festival_notifier_domain::model::{Channel, DeliveryReceipt, Guild, NotificationPayload};
use festival_notifier_domain::ports::{Messenger, MessengerError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct OutboxWriter {
    path: PathBuf,
    file: Arc<Mutex<tokio::fs::File>>,
}

impl OutboxWriter {
    pub async fn new(path: PathBuf) -> Result<Self, OutboxError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, entry: &OutboxEntry<'_>) -> Result<(), OutboxError> {
        let line = serde_json::to_string(entry)?;
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

/// Messenger that lists guilds and channels through `inner` but writes
/// messages to a JSONL file instead of posting them
pub struct OutboxMessenger {
    writer: OutboxWriter,
    inner: Arc<dyn Messenger>,
}

impl OutboxMessenger {
    pub fn new(writer: OutboxWriter, inner: Arc<dyn Messenger>) -> Self {
        Self { writer, inner }
    }
}

#[derive(Serialize)]
struct OutboxEntry<'a> {
    id: &'a str,
    written_at: String,
    channel_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mention: Option<&'a str>,
    payload: &'a NotificationPayload,
}

#[async_trait]
impl Messenger for OutboxMessenger {
    async fn guilds(&self) -> Result<Vec<Guild>, MessengerError> {
        self.inner.guilds().await
    }

    async fn channels(&self, guild_id: &str) -> Result<Vec<Channel>, MessengerError> {
        self.inner.channels(guild_id).await
    }

    async fn send(
        &self,
        channel_id: &str,
        mention: Option<&str>,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, MessengerError> {
        let id = Uuid::new_v4().to_string();
        let entry = OutboxEntry {
            id: &id,
            written_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            channel_id,
            mention,
            payload,
        };

        self.writer
            .append(&entry)
            .await
            .map_err(|error| MessengerError::Api(format!("Outbox write failed: {}", error)))?;

        tracing::info!(
            channel_id = %channel_id,
            title = %payload.title,
            outbox = %self.writer.path().display(),
            "Wrote message to outbox"
        );

        Ok(DeliveryReceipt { message_id: id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use festival_notifier_domain::model::ChannelKind;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct ReadOnlyMessenger {
        sends: AtomicUsize,
    }

    #[async_trait]
    impl Messenger for ReadOnlyMessenger {
        async fn guilds(&self) -> Result<Vec<Guild>, MessengerError> {
            Ok(vec![Guild {
                id: "g1".to_string(),
                name: "Alpha".to_string(),
            }])
        }

        async fn channels(&self, _guild_id: &str) -> Result<Vec<Channel>, MessengerError> {
            Ok(vec![Channel {
                id: "c1".to_string(),
                name: "general".to_string(),
                kind: ChannelKind::Text,
            }])
        }

        async fn send(
            &self,
            _channel_id: &str,
            _mention: Option<&str>,
            _payload: &NotificationPayload,
        ) -> Result<DeliveryReceipt, MessengerError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(DeliveryReceipt {
                message_id: "live".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn outbox_messenger_writes_jsonl_entry() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("outbox.jsonl");

        let inner = Arc::new(ReadOnlyMessenger {
            sends: AtomicUsize::new(0),
        });
        let writer = OutboxWriter::new(path.clone()).await.expect("writer");
        let messenger = OutboxMessenger::new(writer, inner.clone());

        let payload = NotificationPayload {
            title: "Holi — Wishes".to_string(),
            description: "Happy Holi!".to_string(),
            color: 0xFFB300,
            footer: "footer".to_string(),
            image_url: None,
        };

        assert_eq!(messenger.guilds().await.expect("guilds").len(), 1);
        let receipt = messenger
            .send("c1", Some("@here"), &payload)
            .await
            .expect("send");
        assert!(!receipt.message_id.is_empty());
        assert_eq!(inner.sends.load(Ordering::SeqCst), 0);

        let contents = tokio::fs::read_to_string(&path).await.expect("read outbox");
        let line = contents.trim();
        let value: Value = serde_json::from_str(line).expect("valid json");

        assert_eq!(value["id"], receipt.message_id.as_str());
        assert_eq!(value["channel_id"], "c1");
        assert_eq!(value["mention"], "@here");
        assert_eq!(value["payload"]["title"], "Holi — Wishes");
        assert!(value["payload"].get("image_url").is_none());
    }
}
